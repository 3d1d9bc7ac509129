//! Concurrent producers against a sequencer actor.

use std::sync::Arc;

use logsync::sync::{SequencerActor, SyncError, DEFAULT_QUEUE_DEPTH};
use logsync::{Message, Sequencer};
use logsync_testkit::{multi_producer_fixtures, SentLedger};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_converge_through_actor() {
    let sequencer: Arc<Sequencer> = Arc::new(Sequencer::default());
    let handle = SequencerActor::spawn(Arc::clone(&sequencer), DEFAULT_QUEUE_DEPTH);
    let fixtures = multi_producer_fixtures(6);

    let mut ledger = SentLedger::new();
    let mut tasks = Vec::new();
    for fixture in fixtures {
        let records = fixture.records(40);
        records.iter().cloned().for_each(|r| ledger.note(r));

        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let mut replica = fixture.empty_replica();
            for record in records {
                handle.call(Some(Message::Record(record))).await.unwrap();

                let probe = replica.build_probe();
                let response = handle.call(probe).await.unwrap();
                replica.apply_response(response);
            }
            replica
        }));
    }

    let mut replicas = Vec::new();
    for task in tasks {
        replicas.push(task.await.unwrap());
    }

    let log = sequencer.snapshot();
    assert_eq!(log.len(), 240);
    ledger.verify(&log).unwrap();

    // Each replica saw a prefix; one more probe brings it level.
    for replica in &mut replicas {
        assert_eq!(&log[..replica.records().len()], replica.records());

        let probe = replica.build_probe();
        let response = handle.call(probe).await.unwrap();
        replica.apply_response(response);
        assert_eq!(replica.records(), &log[..]);
    }
}

#[test]
fn handle_fails_once_actor_is_gone() {
    let first = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let sequencer: Arc<Sequencer> = Arc::new(Sequencer::default());
    let handle = first.block_on(async { SequencerActor::spawn(sequencer, 4) });
    // Shutting down the runtime drops the actor task.
    drop(first);

    let fixtures = multi_producer_fixtures(1);
    let record = fixtures[0].record(&[("x", "1")]);

    let second = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let result = second.block_on(handle.call(Some(Message::Record(record))));

    assert!(matches!(result, Err(SyncError::ActorClosed)));
}
