//! Back-to-back transfer properties: for any payload and any pacing
//! configuration, two links wired through the simulated bus converge on
//! the exact payload, exactly once, with lawful sequence numbers.

use canlink_core::{LinkConfig, ReceiveStatus, SendStatus};
use canlink_harness::{ShimEvent, Side, SimDriver, consecutive_sns, sn_law_holds};
use proptest::prelude::*;

fn recv_done_count(events: &[ShimEvent]) -> usize {
    events.iter().filter(|event| matches!(event, ShimEvent::RecvDone)).count()
}

#[test]
fn prop_round_trip_converges() {
    proptest!(ProptestConfig::with_cases(64), |(
        payload in prop::collection::vec(any::<u8>(), 1..=600),
    )| {
        let mut left_send = vec![0u8; 1024];
        let mut left_recv = vec![0u8; 1024];
        let mut right_send = vec![0u8; 1024];
        let mut right_recv = vec![0u8; 1024];
        let mut driver = SimDriver::new(
            (&mut left_send[..], &mut left_recv[..]),
            (&mut right_send[..], &mut right_recv[..]),
        );

        driver.link_mut(Side::Left).send(&payload, payload.len()).unwrap();
        let arrived = driver.run_until(10_000, |d| {
            d.link(Side::Right).receive_status() == ReceiveStatus::Full
        });
        prop_assert!(arrived, "transfer did not converge");

        let mut out = vec![0u8; 1024];
        let size = driver.link_mut(Side::Right).receive(&mut out).unwrap();
        prop_assert_eq!(size, payload.len());
        prop_assert_eq!(&out[..size], payload.as_slice());

        // Exactly one completion on each side.
        prop_assert_eq!(recv_done_count(&driver.events(Side::Right)), 1);
        prop_assert_eq!(driver.link(Side::Left).send_status(), SendStatus::Idle);

        // CF sequence numbers run 1, 2, ..., 15, 0, 1, ...
        prop_assert!(sn_law_holds(&consecutive_sns(driver.tap(), Side::Left)));
    });
}

#[test]
fn prop_round_trip_under_pacing_configs() {
    proptest!(ProptestConfig::with_cases(32), |(
        payload in prop::collection::vec(any::<u8>(), 8..=300),
        block_size in 0u8..=4,
        st_min_ms in 0u8..=3,
    )| {
        let right_config = LinkConfig { block_size, st_min_ms, ..LinkConfig::default() };

        let mut left_send = vec![0u8; 512];
        let mut left_recv = vec![0u8; 512];
        let mut right_send = vec![0u8; 512];
        let mut right_recv = vec![0u8; 512];
        let mut driver = SimDriver::with_configs(
            (&mut left_send[..], &mut left_recv[..]),
            (&mut right_send[..], &mut right_recv[..]),
            LinkConfig::default(),
            right_config,
        );

        driver.link_mut(Side::Left).send(&payload, payload.len()).unwrap();
        let arrived = driver.run_until(20_000, |d| {
            d.link(Side::Right).receive_status() == ReceiveStatus::Full
        });
        prop_assert!(arrived, "transfer did not converge under bs={} st={}", block_size, st_min_ms);

        let mut out = vec![0u8; 512];
        let size = driver.link_mut(Side::Right).receive(&mut out).unwrap();
        prop_assert_eq!(size, payload.len());
        prop_assert_eq!(&out[..size], payload.as_slice());
        prop_assert!(sn_law_holds(&consecutive_sns(driver.tap(), Side::Left)));
    });
}

#[test]
fn maximum_length_message_round_trips() {
    let payload: Vec<u8> = (0..4095u32).map(|i| (i * 7) as u8).collect();

    let mut left_send = vec![0u8; 4096];
    let mut left_recv = vec![0u8; 4096];
    let mut right_send = vec![0u8; 4096];
    let mut right_recv = vec![0u8; 4096];
    let mut driver = SimDriver::new(
        (&mut left_send[..], &mut left_recv[..]),
        (&mut right_send[..], &mut right_recv[..]),
    );

    driver.link_mut(Side::Left).send(&payload, payload.len()).unwrap();
    let arrived =
        driver.run_until(10_000, |d| d.link(Side::Right).receive_status() == ReceiveStatus::Full);
    assert!(arrived);

    let mut out = vec![0u8; 4096];
    let size = driver.link_mut(Side::Right).receive(&mut out).unwrap();
    assert_eq!(size, 4095);
    assert_eq!(&out[..4095], payload.as_slice());

    // 585 consecutive frames, sequence numbers wrapping all the way.
    let sns = consecutive_sns(driver.tap(), Side::Left);
    assert_eq!(sns.len(), 585);
    assert!(sn_law_holds(&sns));
}

#[test]
fn both_directions_transfer_independently() {
    let ping: Vec<u8> = (1..=40).collect();
    let pong: Vec<u8> = (100..=160).collect();

    let mut left_send = vec![0u8; 256];
    let mut left_recv = vec![0u8; 256];
    let mut right_send = vec![0u8; 256];
    let mut right_recv = vec![0u8; 256];
    let mut driver = SimDriver::new(
        (&mut left_send[..], &mut left_recv[..]),
        (&mut right_send[..], &mut right_recv[..]),
    );

    driver.link_mut(Side::Left).send(&ping, ping.len()).unwrap();
    driver.link_mut(Side::Right).send(&pong, pong.len()).unwrap();

    let arrived = driver.run_until(1_000, |d| {
        d.link(Side::Left).receive_status() == ReceiveStatus::Full
            && d.link(Side::Right).receive_status() == ReceiveStatus::Full
    });
    assert!(arrived, "concurrent transfers interfered");

    let mut out = vec![0u8; 256];
    let size = driver.link_mut(Side::Right).receive(&mut out).unwrap();
    assert_eq!(&out[..size], ping.as_slice());
    let size = driver.link_mut(Side::Left).receive(&mut out).unwrap();
    assert_eq!(&out[..size], pong.as_slice());
}
