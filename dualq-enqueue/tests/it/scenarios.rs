use std::sync::Arc;

use bytes::Bytes;
use dualq_common::ManualClock;
use dualq_enqueue::{
    Action, BindError, BindingMode, CouplingState, EcnEnqueue, EnqueueOptions, Error, Output,
    Outputs, StaticTopology,
};
use dualq_wire::IpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;

use crate::helpers::{classic, ipv4, l4s, outputs, topology, Collector, TestQueue};

#[test]
fn ect2_packet_is_admitted_to_empty_scalable_queue() {
    let _ = tracing_subscriber::fmt::try_init();

    let (cq, lq) = (TestQueue::with_len(0), TestQueue::with_len(0));
    let (classical, scalable) = (Arc::new(Collector::default()), Arc::new(Collector::default()));
    let coupling = CouplingState::new();
    let clock = Arc::new(ManualClock::new(5_000));

    let enqueue = EcnEnqueue::new(
        "enqueue",
        EnqueueOptions::new(10),
        outputs(classical.clone(), scalable.clone()),
    )
    .unwrap()
    .with_coupling(coupling.clone())
    .with_clock(clock);
    enqueue.initialize(&topology(&[cq, lq])).unwrap();
    assert_eq!(enqueue.mode(), BindingMode::Paired);

    assert_eq!(enqueue.scalable_occupancy(), 0);
    assert_eq!(enqueue.push(l4s()), Action::ForwardScalable);

    assert_eq!(scalable.len(), 1);
    assert_eq!(classical.len(), 0);
    assert_eq!(coupling.last_scalable_admit(), 5_000);
    assert_eq!(coupling.last_classical_admit(), 0);
    assert_eq!(enqueue.drops(), 0);
}

#[test]
fn unmarked_packet_is_dropped_when_classical_queue_is_full() {
    let _ = tracing_subscriber::fmt::try_init();

    let (cq, lq) = (TestQueue::with_len(1), TestQueue::with_len(0));
    let (classical, scalable) = (Arc::new(Collector::default()), Arc::new(Collector::default()));
    let coupling = CouplingState::new();

    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(1),
        outputs(classical.clone(), scalable.clone()),
        coupling.clone(),
        &topology(&[cq, lq]),
    )
    .unwrap();

    assert_eq!(enqueue.push(classic()), Action::Drop);
    assert_eq!(enqueue.drops(), 1);
    assert_eq!(classical.len(), 0);
    assert_eq!(coupling.last_classical_admit(), 0);

    // The scalable queue is unaffected by the classical one
    assert_eq!(enqueue.push(l4s()), Action::ForwardScalable);
    assert_eq!(enqueue.drops(), 1);
}

#[test]
fn three_queues_are_pooled() {
    let queues = [TestQueue::with_len(1), TestQueue::with_len(2), TestQueue::with_len(3)];
    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(7),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &topology(&queues),
    )
    .unwrap();

    assert_eq!(enqueue.mode(), BindingMode::Aggregate);
    assert_eq!(enqueue.classical_occupancy(), 6);
    assert_eq!(enqueue.scalable_occupancy(), 6);
    assert_eq!(enqueue.total_occupancy(), 6);

    // Both classes are measured against the pool
    assert_eq!(enqueue.push(classic()), Action::ForwardClassical);
    queues[0].grow();
    assert_eq!(enqueue.push(l4s()), Action::Drop);
    assert_eq!(enqueue.push(classic()), Action::Drop);
}

#[test]
fn headerless_and_non_tcp_packets_are_classical() {
    let (cq, lq) = (TestQueue::with_len(0), TestQueue::with_len(5));
    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(5),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &topology(&[cq, lq]),
    )
    .unwrap();

    let arp = IpPacket::new(Bytes::from_static(&[0x00, 0x01, 0x08, 0x00, 0x06, 0x04]));
    assert_eq!(enqueue.push(arp), Action::ForwardClassical);

    let udp = ipv4(0b01, IpNextHeaderProtocols::Udp);
    assert_eq!(enqueue.push(udp), Action::ForwardClassical);

    // CE and ECT(1) stay classical
    assert_eq!(enqueue.push(ipv4(0b11, IpNextHeaderProtocols::Tcp)), Action::ForwardClassical);
    assert_eq!(enqueue.push(ipv4(0b10, IpNextHeaderProtocols::Tcp)), Action::ForwardClassical);

    // ECT(2) over TCP hits the full scalable queue
    assert_eq!(enqueue.push(l4s()), Action::Drop);
}

#[test]
fn dropped_packets_are_diverted_to_overflow_output() {
    let (cq, lq) = (TestQueue::with_len(2), TestQueue::with_len(2));
    let overflow = Arc::new(Collector::default());
    let unused = Arc::new(Collector::default());
    let extra: Vec<Arc<dyn Output<IpPacket>>> = vec![overflow.clone(), unused.clone()];

    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(2),
        Outputs::new(Arc::new(Collector::default()), Arc::new(Collector::default()))
            .with_extra(extra),
        CouplingState::new(),
        &topology(&[cq, lq]),
    )
    .unwrap();

    assert_eq!(enqueue.outputs().count(), 4);
    assert_eq!(enqueue.push(classic()), Action::Drop);
    assert_eq!(enqueue.push(l4s()), Action::Drop);
    assert_eq!(overflow.len(), 2);
    assert_eq!(unused.len(), 0);
    assert_eq!(enqueue.drops(), 2);
}

#[test]
fn explicit_queue_list_bypasses_discovery() {
    let (a, b, c) = (TestQueue::with_len(0), TestQueue::with_len(3), TestQueue::with_len(0));
    let mut topology = topology(&[a, b]);
    topology.add_queue("standalone", c);

    let options: EnqueueOptions = "LIMIT 3, QUEUES standalone queue1".parse().unwrap();
    let enqueue = EcnEnqueue::bound(
        "enqueue",
        options.clone(),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &topology,
    )
    .unwrap();

    assert_eq!(enqueue.queue_names(), ["standalone", "queue1"]);
    assert_eq!(enqueue.options(), &options);
    assert_eq!(enqueue.push(classic()), Action::ForwardClassical);
    assert_eq!(enqueue.push(l4s()), Action::Drop);
}

#[test]
fn startup_is_refused_without_queues() {
    let mut empty = StaticTopology::new();
    empty.add_node("enqueue").add_node("discard").connect("enqueue", "discard");

    let err = EcnEnqueue::<IpPacket>::bound(
        "enqueue",
        EnqueueOptions::new(10),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &empty,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Bind(BindError::NoQueuesFound)));

    let err = EcnEnqueue::<IpPacket>::bound(
        "enqueue",
        EnqueueOptions::new(0),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &empty,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn stats_snapshot_reports_counters() {
    let (cq, lq) = (TestQueue::with_len(0), TestQueue::with_len(0));
    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(1),
        outputs(Arc::default(), Arc::default()),
        CouplingState::new(),
        &topology(&[cq.clone(), lq]),
    )
    .unwrap();

    enqueue.push(classic());
    enqueue.push(l4s());
    enqueue.push(l4s());
    cq.set_len(1);
    enqueue.push(classic());

    let stats = enqueue.stats();
    assert_eq!(stats.limit, 1);
    assert_eq!(stats.classical_occupancy, 1);
    assert_eq!(stats.scalable_occupancy, 0);
    assert_eq!(stats.total_occupancy, 1);
    assert_eq!(stats.classical_forwarded, 1);
    assert_eq!(stats.scalable_forwarded, 2);
    assert_eq!(stats.drops, 1);
}

#[test]
fn first_admission_on_default_clock_is_visible() {
    let coupling = CouplingState::new();
    let enqueue = EcnEnqueue::bound(
        "enqueue",
        EnqueueOptions::new(10),
        outputs(Arc::default(), Arc::default()),
        coupling.clone(),
        &topology(&[TestQueue::with_len(0), TestQueue::with_len(0)]),
    )
    .unwrap();

    assert_eq!(enqueue.push(l4s()), Action::ForwardScalable);
    assert_ne!(coupling.last_scalable_admit(), 0);
    assert_eq!(coupling.last_classical_admit(), 0);

    assert_eq!(enqueue.push(classic()), Action::ForwardClassical);
    assert_ne!(coupling.last_classical_admit(), 0);
}

#[test]
fn controller_that_failed_to_bind_admits_nothing() {
    let mut empty = StaticTopology::new();
    empty.add_node("enqueue").add_node("discard").connect("enqueue", "discard");

    let (classical, scalable) = (Arc::new(Collector::default()), Arc::new(Collector::default()));
    let overflow = Arc::new(Collector::default());
    let extra: Vec<Arc<dyn Output<IpPacket>>> = vec![overflow.clone()];
    let coupling = CouplingState::new();

    let enqueue = EcnEnqueue::new(
        "enqueue",
        EnqueueOptions::new(1),
        Outputs::new(classical.clone(), scalable.clone()).with_extra(extra),
    )
    .unwrap()
    .with_coupling(coupling.clone());
    assert_eq!(enqueue.initialize(&empty), Err(BindError::NoQueuesFound));
    assert!(!enqueue.is_operational());

    for _ in 0..5 {
        assert_eq!(enqueue.push(classic()), Action::Drop);
    }
    assert_eq!(enqueue.push(l4s()), Action::Drop);

    assert_eq!(classical.len(), 0);
    assert_eq!(scalable.len(), 0);
    assert_eq!(overflow.len(), 6);
    assert_eq!(enqueue.drops(), 6);
    assert_eq!(enqueue.stats().classical_forwarded, 0);
    assert_eq!(coupling.last_classical_admit(), 0);
    assert_eq!(coupling.last_scalable_admit(), 0);
}
