mod common;

use artnode_core::packets::ArtSync;
use common::*;

fn sync() -> Vec<u8> {
    encode(|buf| ArtSync.encode(buf))
}

fn synced_harness() -> Harness {
    let mut h = Harness::started(&config_with(vec![output_port(0x0001)]));
    h.receive(&dmx(0x0001, &[1, 1]), CONTROLLER_A);
    h.receive(&sync(), CONTROLLER_A);
    assert!(h.node.is_synchronous_mode());
    h
}

#[test]
fn test_sync_releases_buffered_frame() {
    let mut h = synced_harness();
    h.receive(&dmx(0x0001, &[5, 6]), CONTROLLER_A);
    assert_eq!(h.output(0), vec![1, 1]);
    assert!(h.node.output(0).unwrap().is_data_pending);

    h.receive(&sync(), CONTROLLER_A);
    assert_eq!(h.output(0), vec![5, 6]);
    assert!(!h.node.output(0).unwrap().is_data_pending);
}

#[test]
fn test_sync_from_other_controller_ignored() {
    let mut h = Harness::started(&config_with(vec![output_port(0x0001)]));
    h.receive(&dmx(0x0001, &[1, 1]), CONTROLLER_A);
    h.receive(&sync(), CONTROLLER_B);
    assert!(!h.node.is_synchronous_mode());
}

#[test]
fn test_sync_expires_after_four_seconds() {
    let mut h = synced_harness();
    h.advance(3_999);
    h.receive(&dmx(0x0001, &[2, 2]), CONTROLLER_A);
    assert!(h.node.is_synchronous_mode());
    assert_eq!(h.output(0), vec![1, 1]);

    h.advance(1);
    h.receive(&dmx(0x0001, &[3, 3]), CONTROLLER_A);
    assert!(!h.node.is_synchronous_mode());
    assert_eq!(h.output(0), vec![3, 3]);
}

#[test]
fn test_sync_ignored_while_merging() {
    let mut h = Harness::started(&config_with(vec![output_port(0x0001)]));
    h.receive(&dmx(0x0001, &[1, 1]), CONTROLLER_A);
    h.receive(&dmx(0x0001, &[2, 2]), CONTROLLER_B);
    h.receive(&sync(), CONTROLLER_B);
    assert!(!h.node.is_synchronous_mode());
}

#[test]
fn test_merged_frames_bypass_sync() {
    let mut h = synced_harness();
    h.receive(&dmx(0x0001, &[9, 0]), CONTROLLER_B);
    assert!(h.node.is_merge_mode());
    assert_eq!(h.output(0), vec![9, 1]);
}
