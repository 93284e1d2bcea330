use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use cc_app::usecases::{PastePlan, PasteRoleUseCase, SignRoleUseCase, StabilizePolicy};
use cc_app::wire::EnvelopeStream;
use cc_core::ports::ClipboardPort;
use cc_core::{Digest, Envelope, MismatchKind, PasteOutcome, ProtocolError, TestPayload};
use mockall::mock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::AsyncWriteExt;

/// One clipboard seen by both sides, standing in for a working
/// host/guest propagation.
#[derive(Clone, Default)]
struct SharedClipboard {
    text: Arc<Mutex<String>>,
}

impl ClipboardPort for SharedClipboard {
    fn get(&self) -> Result<String> {
        let text = self
            .text
            .lock()
            .map_err(|_| anyhow!("clipboard lock poisoned"))?;
        Ok(text.clone())
    }

    fn set(&self, text: &str) -> Result<()> {
        let mut guard = self
            .text
            .lock()
            .map_err(|_| anyhow!("clipboard lock poisoned"))?;
        *guard = text.to_string();
        Ok(())
    }
}

/// Returns scripted reads in order and then repeats the last one.
struct ScriptedClipboard {
    reads: Mutex<VecDeque<String>>,
    read_count: Mutex<usize>,
}

impl ScriptedClipboard {
    fn new(reads: Vec<String>) -> Self {
        Self {
            reads: Mutex::new(reads.into()),
            read_count: Mutex::new(0),
        }
    }

    fn reads(&self) -> usize {
        *self.read_count.lock().unwrap()
    }
}

impl ClipboardPort for ScriptedClipboard {
    fn get(&self) -> Result<String> {
        *self.read_count.lock().unwrap() += 1;
        let mut reads = self.reads.lock().unwrap();
        if reads.len() > 1 {
            Ok(reads.pop_front().unwrap_or_default())
        } else {
            Ok(reads.front().cloned().unwrap_or_default())
        }
    }

    fn set(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

mock! {
    pub Clipboard {}

    impl ClipboardPort for Clipboard {
        fn get(&self) -> Result<String>;
        fn set(&self, text: &str) -> Result<()>;
    }
}

fn paste_envelope(text: &str) -> Envelope {
    Envelope::Paste {
        digest: Digest::of(text.as_bytes()),
        payload: text.to_string(),
    }
}

#[tokio::test]
async fn test_paste_and_sign_agree_over_shared_clipboard() {
    let clipboard = SharedClipboard::default();
    let (paste_io, sign_io) = tokio::io::duplex(4096);

    let paster = PasteRoleUseCase::new(Arc::new(clipboard.clone()));
    let signer = SignRoleUseCase::new(Arc::new(clipboard), StabilizePolicy::default());

    let sign_task = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(sign_io);
        signer.execute(&mut stream).await
    });

    let mut rng = StdRng::seed_from_u64(42);
    let mut stream = EnvelopeStream::new(paste_io);
    let plan = PastePlan {
        iterations: 3,
        payload_len: 100,
    };
    let report = paster.execute(&mut stream, plan, &mut rng).await.unwrap();
    drop(stream);

    assert!(report.passed());
    assert_eq!(report.completed, 3);

    let sign_report = sign_task.await.unwrap().unwrap();
    assert_eq!(sign_report.signed, 3);
    assert!(sign_report.mismatches.is_empty());
}

#[tokio::test]
async fn test_paste_writes_clipboard_once_per_iteration() {
    let mut clipboard = MockClipboard::new();
    clipboard
        .expect_set()
        .times(2)
        .withf(|text: &str| text.len() == 20 && text.chars().all(|c| c.is_ascii_digit()))
        .returning(|_| Ok(()));
    clipboard.expect_get().never();

    let (paste_io, peer_io) = tokio::io::duplex(4096);

    // Peer that signs whatever payload it is sent.
    let peer = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(peer_io);
        while let Some(Envelope::Paste { payload, .. }) = stream.receive().await.unwrap() {
            let reply = Envelope::Signed {
                digest: Digest::of(payload.as_bytes()),
            };
            stream.send(&reply).await.unwrap();
        }
    });

    let paster = PasteRoleUseCase::new(Arc::new(clipboard));
    let mut stream = EnvelopeStream::new(paste_io);
    let mut rng = StdRng::seed_from_u64(1);
    let plan = PastePlan {
        iterations: 2,
        payload_len: 20,
    };

    let report = paster.execute(&mut stream, plan, &mut rng).await.unwrap();
    drop(stream);
    peer.await.unwrap();

    assert_eq!(report.outcome, PasteOutcome::Passed);
    assert_eq!(report.completed, 2);
}

#[tokio::test]
async fn test_paste_stops_at_first_wrong_digest() {
    let (paste_io, peer_io) = tokio::io::duplex(4096);
    let wrong = Digest::of(b"something else");
    let wrong_reply = wrong.clone();

    let peer = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(peer_io);
        let first = stream.receive().await.unwrap();
        assert!(matches!(first, Some(Envelope::Paste { .. })));
        stream
            .send(&Envelope::Signed {
                digest: wrong_reply,
            })
            .await
            .unwrap();
        // Nothing else must arrive.
        stream.receive().await.unwrap()
    });

    let paster = PasteRoleUseCase::new(Arc::new(SharedClipboard::default()));
    let mut stream = EnvelopeStream::new(paste_io);
    let mut rng = StdRng::seed_from_u64(3);
    let plan = PastePlan {
        iterations: 10,
        payload_len: 30,
    };

    let report = paster.execute(&mut stream, plan, &mut rng).await.unwrap();
    drop(stream);

    assert_eq!(report.completed, 0);
    match report.outcome {
        PasteOutcome::Mismatch {
            iteration,
            expected,
            actual,
        } => {
            assert_eq!(iteration, 0);
            assert_eq!(actual, wrong);
            assert_ne!(expected, wrong);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
    assert_eq!(peer.await.unwrap(), None);
}

#[tokio::test]
async fn test_paste_reports_peer_closed() {
    let (paste_io, peer_io) = tokio::io::duplex(4096);
    drop(peer_io);

    let paster = PasteRoleUseCase::new(Arc::new(SharedClipboard::default()));
    let mut stream = EnvelopeStream::new(paste_io);
    let mut rng = StdRng::seed_from_u64(3);
    let plan = PastePlan {
        iterations: 5,
        payload_len: 10,
    };

    let result = paster.execute(&mut stream, plan, &mut rng).await;

    // Writing to a closed duplex fails before the read can observe EOF.
    match result {
        Ok(report) => assert_eq!(report.outcome, PasteOutcome::PeerClosed),
        Err(err) => assert!(err.downcast_ref::<std::io::Error>().is_some()),
    }
}

#[tokio::test(start_paused = true)]
async fn test_sign_waits_out_stale_clipboard() {
    let first = TestPayload::generate(100, 17).into_string();
    let second = TestPayload::generate(100, 512).into_string();

    // Iteration 1 sees `first` right away; iteration 2 sees the stale
    // `first` five times before `second` shows up.
    let mut reads = vec![first.clone()];
    reads.extend(std::iter::repeat(first.clone()).take(5));
    reads.push(second.clone());
    let clipboard = Arc::new(ScriptedClipboard::new(reads));

    let (peer_io, sign_io) = tokio::io::duplex(4096);
    let signer = SignRoleUseCase::new(clipboard.clone(), StabilizePolicy::default());
    let sign_task = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(sign_io);
        signer.execute(&mut stream).await
    });

    let mut stream = EnvelopeStream::new(peer_io);
    for expected in [&first, &second] {
        stream.send(&paste_envelope(expected)).await.unwrap();
        let reply = stream.receive().await.unwrap();
        assert_eq!(
            reply,
            Some(Envelope::Signed {
                digest: Digest::of(expected.as_bytes())
            })
        );
    }
    drop(stream);

    let report = sign_task.await.unwrap().unwrap();
    assert_eq!(report.signed, 2);
    assert!(report.mismatches.is_empty());
    assert_eq!(clipboard.reads(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_sign_survives_transient_clipboard_errors() {
    let text = TestPayload::generate(100, 9).into_string();
    let served = text.clone();
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = reads.clone();

    let mut clipboard = MockClipboard::new();
    clipboard.expect_get().returning(move || {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(anyhow!("ContentNotAvailable"))
        } else {
            Ok(served.clone())
        }
    });
    clipboard.expect_set().never();

    let (peer_io, sign_io) = tokio::io::duplex(4096);
    let signer = SignRoleUseCase::new(Arc::new(clipboard), StabilizePolicy::default());
    let sign_task = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(sign_io);
        signer.execute(&mut stream).await
    });

    let mut stream = EnvelopeStream::new(peer_io);
    stream.send(&paste_envelope(&text)).await.unwrap();
    let reply = stream.receive().await.unwrap();
    assert_eq!(
        reply,
        Some(Envelope::Signed {
            digest: Digest::of(text.as_bytes())
        })
    );
    drop(stream);

    let report = sign_task.await.unwrap().unwrap();
    assert_eq!(report.signed, 1);
    assert!(report.mismatches.is_empty());
    assert_eq!(reads.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_sign_replies_even_when_clipboard_never_reads() {
    let mut clipboard = MockClipboard::new();
    clipboard
        .expect_get()
        .returning(|| Err(anyhow!("ContentNotAvailable")));

    let (peer_io, sign_io) = tokio::io::duplex(1 << 20);
    let signer = SignRoleUseCase::new(Arc::new(clipboard), StabilizePolicy::default());
    let sign_task = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(sign_io);
        signer.execute(&mut stream).await
    });

    let text = TestPayload::generate(20_000, 3).into_string();
    let mut stream = EnvelopeStream::new(peer_io);
    stream.send(&paste_envelope(&text)).await.unwrap();
    let reply = stream.receive().await.unwrap();
    assert_eq!(
        reply,
        Some(Envelope::Signed {
            digest: Digest::of(b"")
        })
    );
    drop(stream);

    let report = sign_task.await.unwrap().unwrap();
    assert_eq!(report.mismatches.len(), 2);
    let payload_event = &report.mismatches[0];
    assert_eq!(payload_event.kind, MismatchKind::PayloadMismatch);
    assert_eq!(payload_event.expected_len, 20_000);
    assert!(payload_event.expected.len() <= 64);
    assert_eq!(payload_event.observed_len, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sign_records_mismatches_and_keeps_going() {
    let clipboard = Arc::new(ScriptedClipboard::new(vec!["not a payload".to_string()]));
    let policy = StabilizePolicy {
        max_attempts: 30,
        interval: Duration::from_millis(200),
    };

    let (peer_io, sign_io) = tokio::io::duplex(4096);
    let signer = SignRoleUseCase::new(clipboard.clone(), policy);
    let sign_task = tokio::spawn(async move {
        let mut stream = EnvelopeStream::new(sign_io);
        signer.execute(&mut stream).await
    });

    let mut stream = EnvelopeStream::new(peer_io);
    for seed in [1, 2] {
        let text = TestPayload::generate(50, seed).into_string();
        stream.send(&paste_envelope(&text)).await.unwrap();
        let reply = stream.receive().await.unwrap();
        assert_eq!(
            reply,
            Some(Envelope::Signed {
                digest: Digest::of(b"not a payload")
            })
        );
    }
    drop(stream);

    let report = sign_task.await.unwrap().unwrap();
    assert_eq!(report.signed, 2);
    assert_eq!(report.mismatches.len(), 4);
    assert_eq!(report.mismatches[0].kind, MismatchKind::PayloadMismatch);
    assert_eq!(report.mismatches[0].iteration, 1);
    assert_eq!(report.mismatches[1].kind, MismatchKind::DigestMismatch);
    assert_eq!(report.mismatches[1].observed_len, "not a payload".len());
    assert_eq!(report.mismatches[3].iteration, 2);
    // One initial read plus the full retry budget per iteration.
    assert_eq!(clipboard.reads(), 2 * 31);
}

#[tokio::test]
async fn test_sign_exits_cleanly_on_partial_envelope() {
    let (mut peer_io, sign_io) = tokio::io::duplex(4096);
    let wire = paste_envelope("0123456789").to_wire().unwrap();
    peer_io.write_all(&wire[..wire.len() / 2]).await.unwrap();
    drop(peer_io);

    let signer = SignRoleUseCase::new(
        Arc::new(SharedClipboard::default()),
        StabilizePolicy::default(),
    );
    let mut stream = EnvelopeStream::new(sign_io);

    let report = signer.execute(&mut stream).await.unwrap();

    assert_eq!(report.signed, 0);
    assert!(report.mismatches.is_empty());
}

#[tokio::test]
async fn test_sign_rejects_signed_envelope() {
    let (peer_io, sign_io) = tokio::io::duplex(4096);
    let mut peer = EnvelopeStream::new(peer_io);
    peer.send(&Envelope::Signed {
        digest: Digest::of(b"x"),
    })
    .await
    .unwrap();

    let signer = SignRoleUseCase::new(
        Arc::new(SharedClipboard::default()),
        StabilizePolicy::default(),
    );
    let mut stream = EnvelopeStream::new(sign_io);

    let err = signer.execute(&mut stream).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProtocolError>(),
        Some(ProtocolError::UnexpectedEnvelope {
            expected: "paste",
            ..
        })
    ));
}
