//! End-to-end protocol scenarios with scripted loss.

use logsync::sync::{ChannelExt, Scripted, ScriptedContent};
use logsync::{ApplyOutcome, Codec, Message, Payload, Sequencer};
use logsync_testkit::{suffix_update, TestFixture};

#[test]
fn first_record_reaches_producer_and_bystander() {
    let sequencer: Sequencer = Sequencer::default();
    let a = TestFixture::new("a");
    let b = TestFixture::new("b");

    let mut producer_a = a.replica(ScriptedContent::new([Some(Payload::new().with("x", "1"))]));
    let mut producer_b = b.empty_replica();

    assert_eq!(sequencer.handle(producer_a.generate()), None);
    assert_eq!(sequencer.len(), 1);

    let probe = producer_a.build_probe();
    assert_eq!(probe, Some(Message::probe(a.producer_id.clone(), 0)));
    let update = sequencer.handle(probe);
    assert_eq!(update, Some(Message::update(0, sequencer.snapshot())));
    assert!(producer_a.apply_response(update).is_applied());
    assert_eq!(producer_a.len(), 1);

    // B never produced anything.
    assert_eq!(producer_b.generate(), None);
    let update = sequencer.handle(producer_b.build_probe());
    producer_b.apply_response(update);

    assert_eq!(producer_b.records()[0], producer_a.records()[0]);
    assert_eq!(producer_b.records()[0].digest(), producer_a.records()[0].digest());
}

#[test]
fn stale_probe_answer_is_discarded() {
    let fixture = TestFixture::default();
    let log = fixture.records(7);
    let mut replica = fixture.replica_holding(&log[..3]);

    let outcome = replica.apply_response(Some(suffix_update(&log, 5)));

    assert_eq!(outcome, ApplyOutcome::Stale { from: 5, local_len: 3 });
    assert_eq!(replica.len(), 3);
    assert_eq!(replica.records(), &log[..3]);
}

#[test]
fn repeated_delivery_does_not_duplicate() {
    let fixture = TestFixture::default();
    let log = fixture.records(4);
    let mut replica = fixture.replica_holding(&log[..2]);
    let update = Message::update(2, log[2..].to_vec());

    replica.apply_response(Some(update.clone()));
    assert_eq!(replica.len(), 4);

    replica.apply_response(Some(update));
    assert_eq!(replica.len(), 4);
    assert_eq!(replica.records(), &log[..]);
}

#[test]
fn lost_updates_are_recovered_by_later_probes() {
    let sequencer: Sequencer = Sequencer::default();
    let fixture = TestFixture::default();
    let mut replica = fixture.empty_replica();
    let mut update_leg = Scripted::drop_first(3);

    for record in fixture.records(5) {
        sequencer.append(record);
        let response = sequencer.handle(replica.build_probe());
        replica.apply_response(update_leg.transmit(response));
    }

    // The first three answers were lost; the fourth carried everything so far.
    assert_eq!(replica.records(), &sequencer.snapshot()[..]);
}

#[test]
fn skipped_probes_leave_replica_untouched() {
    let sequencer: Sequencer = Sequencer::default();
    let fixture = TestFixture::default();
    sequencer.append(fixture.record(&[("x", "1")]));

    let mut replica = fixture
        .empty_replica()
        .with_probe_gate(Scripted::new([false, false], true));

    for _ in 0..2 {
        let probe = replica.build_probe();
        assert_eq!(probe, None);
        assert_eq!(
            replica.apply_response(sequencer.handle(probe)),
            ApplyOutcome::NoMessage
        );
    }

    let probe = replica.build_probe();
    replica.apply_response(sequencer.handle(probe));
    assert_eq!(replica.len(), 1);
}

#[test]
fn malformed_frames_never_mutate_the_log() {
    let sequencer: Sequencer = Sequencer::default();
    let fixture = TestFixture::default();
    let record = fixture.record(&[("x", "1")]);

    let good = Codec::Json.encode(&Message::Record(record)).unwrap();
    assert_eq!(sequencer.handle_frame(Codec::Json, &good), None);
    assert_eq!(sequencer.len(), 1);

    let bad: [&[u8]; 3] = [
        br#"{"kind":"record","payload":{"x":"1"}}"#,
        br#"{"kind":"record","producerId":"","producedAt":1,"payload":{}}"#,
        b"\xff\x00",
    ];
    for frame in bad {
        assert_eq!(sequencer.handle_frame(Codec::Json, frame), None);
    }
    assert_eq!(sequencer.len(), 1);
}

#[test]
fn cbor_frames_drive_catch_up() {
    let sequencer: Sequencer = Sequencer::default();
    let fixture = TestFixture::default();
    let mut replica = fixture.replica(ScriptedContent::new([
        Some(Payload::new().with("a", "1")),
        Some(Payload::new().with("a", "2")),
    ]));

    for _ in 0..2 {
        let produce = Codec::Cbor.encode(&replica.generate().unwrap()).unwrap();
        sequencer.handle_frame(Codec::Cbor, &produce);
    }

    let probe = Codec::Cbor.encode(&replica.build_probe().unwrap()).unwrap();
    let response = sequencer.handle_frame(Codec::Cbor, &probe).unwrap();
    replica.apply_response(Codec::Cbor.decode(&response).ok());

    assert_eq!(replica.len(), 2);
    assert_eq!(replica.records(), &sequencer.snapshot()[..]);
}
