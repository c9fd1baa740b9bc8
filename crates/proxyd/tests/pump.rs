//! Message loops feeding sessions from mpsc streams.

use std::sync::Arc;

use fsfw_proxyd::{pump_controller, pump_switch, MpscControllerChannel, SessionState, SwitchProxies};
use fsfw_slicer::ofp::{Action, OfpType};
use fsfw_test::{
    barrier, flow_mod, packet_in, tagged_frame, test_slicer, MessageVerifier, RecordingSwitch,
    TestSession,
};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_pump_controller_in_order() {
    let session = TestSession::standard();
    let (tx, rx) = mpsc::channel(16);

    tx.send(barrier(1)).await.unwrap();
    tx.send(flow_mod(Some(1), Some(1000), vec![Action::output(2)]))
        .await
        .unwrap();
    tx.send(flow_mod(Some(1), Some(100), vec![Action::output(2)]))
        .await
        .unwrap();
    tx.send(barrier(2)).await.unwrap();
    drop(tx);

    let forwarded = pump_controller(session.proxy.clone(), rx).await;

    assert_eq!(forwarded, 3);
    MessageVerifier::switch(&session.switch)
        .assert_types(&[OfpType::BarrierRequest, OfpType::FlowMod, OfpType::BarrierRequest])
        .unwrap();
    assert_eq!(session.proxy.state(), SessionState::Closed);
    assert!(session.controller.is_closed());
}

#[tokio::test]
async fn test_pump_controller_survives_write_errors() {
    let session = TestSession::standard();
    let (tx, rx) = mpsc::channel(16);
    session.switch.set_fail_writes(true);

    let handle = tokio::spawn(pump_controller(session.proxy.clone(), rx));
    tx.send(barrier(1)).await.unwrap();
    tx.send(flow_mod(Some(2), Some(102), vec![])).await.unwrap();
    drop(tx);

    assert_eq!(handle.await.unwrap(), 0);
    assert_eq!(session.proxy.flow_count(), 0);
}

#[tokio::test]
async fn test_pump_switch_delivers_to_mpsc_controller() {
    let switch = RecordingSwitch::standard();
    let proxies = Arc::new(SwitchProxies::new(switch));
    let proxy = proxies.attach(Arc::new(test_slicer()));

    let (channel, mut controller_rx) = MpscControllerChannel::pair(16);
    proxy.connect(Arc::new(channel)).unwrap();

    let (tx, rx) = mpsc::channel(16);
    tx.send(packet_in(1, tagged_frame(100))).await.unwrap();
    tx.send(packet_in(4, tagged_frame(100))).await.unwrap();
    tx.send(barrier(9)).await.unwrap();
    drop(tx);

    let delivered = pump_switch(proxies.clone(), rx).await;
    assert_eq!(delivered, 2);

    let first = controller_rx.recv().await.unwrap();
    assert_eq!(first.msg_type(), OfpType::PacketIn);
    let second = controller_rx.recv().await.unwrap();
    assert_eq!(second, barrier(9));
}
