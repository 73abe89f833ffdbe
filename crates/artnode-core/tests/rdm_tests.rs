mod common;

use std::cell::RefCell;
use std::rc::Rc;

use artnode_core::packets::tod::{RDM_VERSION, TOD_FULL};
use artnode_core::packets::{
    ArtRdm, ArtTodControl, ArtTodData, ArtTodRequest, OpCode, TodControlCommand,
};
use artnode_core::rdm::message::{command_class, encode_discovery_response, RdmMessage};
use artnode_core::status::good_output_b;
use artnode_core::{NodeConfig, PortParams, RdmController, Uid};
use common::*;

const CONTROLLER_UID: Uid = Uid::new([0x7F, 0xF0, 0x00, 0x00, 0x00, 0x01]);
const DEVICE_1: Uid = Uid::new([0x12, 0x34, 0x00, 0x00, 0x00, 0x01]);
const DEVICE_2: Uid = Uid::new([0x12, 0x34, 0x00, 0x00, 0x00, 0x02]);

/// Ticks an empty line needs for a full pass: two un-mutes, three branch tries
const EMPTY_PASS_TICKS: usize = 5;

fn rdm_output() -> PortParams {
    PortParams {
        rdm_enabled: true,
        ..output_port(0x0001)
    }
}

fn rdm_harness(config: &NodeConfig) -> (Harness, Rc<RefCell<LineState>>) {
    let mut h = Harness::new(config);
    let line = Rc::new(RefCell::new(LineState::default()));
    h.node.set_rdm_controller(RdmController::new(
        Box::new(MockRdmLine(line.clone())),
        CONTROLLER_UID,
    ));
    h.node.start().unwrap();
    (h, line)
}

fn tick_n(h: &mut Harness, n: usize) {
    for _ in 0..n {
        h.tick();
    }
}

fn tod_packets(h: &Harness) -> Vec<ArtTodData> {
    h.take_sent_op(OpCode::TodData)
        .into_iter()
        .filter_map(|(ip, data)| {
            assert_eq!(ip, BROADCAST);
            ArtTodData::decode(&data)
        })
        .collect()
}

fn get_request(destination: Uid) -> RdmMessage {
    RdmMessage {
        destination,
        source: CONTROLLER_UID,
        transaction: 7,
        port_id: 1,
        message_count: 0,
        sub_device: 0,
        command_class: command_class::GET_COMMAND,
        parameter_id: 0x0060,
        data: Vec::new(),
    }
}

fn art_rdm(address: u8, message: &RdmMessage) -> Vec<u8> {
    let frame = message.encode();
    encode(|buf| {
        ArtRdm {
            rdm_version: RDM_VERSION,
            net: 0,
            command: 0,
            address,
            rdm_packet: &frame[1..],
        }
        .encode(buf)
    })
}

fn tod_data(address: u8, uids: Vec<Uid>) -> Vec<u8> {
    encode(|buf| {
        ArtTodData {
            rdm_version: RDM_VERSION,
            port: 1,
            bind_index: 1,
            net: 0,
            command_response: 0,
            address,
            uid_total: uids.len() as u16,
            block_count: 0,
            uids,
        }
        .encode(buf)
    })
}

fn tod_control(address: u8, command: TodControlCommand) -> Vec<u8> {
    encode(|buf| {
        ArtTodControl {
            net: 0,
            command,
            address,
        }
        .encode(buf)
    })
}

#[test]
fn test_start_discovery_on_empty_line() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    h.take_sent();
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_eq!(flags & good_output_b::DISCOVERY_NOT_RUNNING, 0);

    tick_n(&mut h, EMPTY_PASS_TICKS - 1);
    assert!(tod_packets(&h).is_empty());

    h.tick();
    let tods = tod_packets(&h);
    assert_eq!(tods.len(), 1);
    assert_eq!(tods[0].uid_total, 0);
    assert_eq!(tods[0].port, 1);
    assert_eq!(tods[0].address, 0x01);
    assert!(h.node.rdm().unwrap().is_finished(0));

    let flags = h.node.output(0).unwrap().good_output_b;
    assert_ne!(flags & good_output_b::DISCOVERY_NOT_RUNNING, 0);

    // Finished stays finished and the TOD is not sent again
    tick_n(&mut h, 3);
    assert!(tod_packets(&h).is_empty());
    assert_eq!(h.node.rdm().unwrap().tod(0).map(|tod| tod.len()), Some(0));
}

#[test]
fn test_tod_request_answered_for_matching_port() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.take_sent();

    let request = |addresses: &[u8]| {
        encode(|buf| {
            ArtTodRequest {
                net: 0,
                command: TOD_FULL,
                addresses,
            }
            .encode(buf)
        })
    };
    h.receive(&request(&[0x05]), CONTROLLER_A);
    assert!(tod_packets(&h).is_empty());

    h.receive(&request(&[0x05, 0x01]), CONTROLLER_A);
    assert_eq!(tod_packets(&h).len(), 1);
}

#[test]
fn test_input_port_requests_tod_at_start() {
    let (h, _line) = rdm_harness(&config_with(vec![input_port(0x0002)]));
    let requests: Vec<_> = h
        .take_sent_op(OpCode::TodRequest)
        .into_iter()
        .map(|(ip, data)| (ip, ArtTodRequest::decode(&data).map(|r| r.addresses.to_vec())))
        .collect();
    assert_eq!(requests, vec![(BROADCAST, Some(vec![0x02]))]);
}

#[test]
fn test_tod_data_fills_proxy_table() {
    let (mut h, _line) = rdm_harness(&config_with(vec![input_port(0x0002)]));
    h.receive(&tod_data(0x02, vec![DEVICE_1, DEVICE_2, DEVICE_1]), CONTROLLER_A);
    assert_eq!(h.node.rdm().unwrap().tod(0).map(|tod| tod.len()), Some(2));

    // Other universe
    h.receive(&tod_data(0x03, vec![Uid::new([1, 2, 3, 4, 5, 6])]), CONTROLLER_A);
    assert_eq!(h.node.rdm().unwrap().tod(0).map(|tod| tod.len()), Some(2));
}

#[test]
fn test_proxy_answers_discovery_and_forwards_get() {
    let (mut h, line) = rdm_harness(&config_with(vec![input_port(0x0002)]));
    h.receive(&tod_data(0x02, vec![DEVICE_1]), CONTROLLER_A);
    h.take_sent();

    let branch = RdmMessage::unique_branch(
        CONTROLLER_UID,
        1,
        Uid::from_u64(0),
        Uid::from_u64(Uid::MAX_DISCOVERABLE),
    );
    line.borrow_mut().incoming.push_back((0, branch.encode()));
    h.tick();
    let answer = encode_discovery_response(&DEVICE_1).to_vec();
    assert!(line.borrow().sent.contains(&(0, answer)));

    let request = get_request(DEVICE_1);
    line.borrow_mut().incoming.push_back((0, request.encode()));
    h.tick();
    let forwarded = h.take_sent_op(OpCode::Rdm);
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].0, BROADCAST);
    let packet = ArtRdm::decode(&forwarded[0].1).unwrap();
    assert_eq!(packet.address, 0x02);
    assert_eq!(packet.rdm_packet, &request.encode()[1..]);

    // Unknown device is not forwarded
    line.borrow_mut()
        .incoming
        .push_back((0, get_request(DEVICE_2).encode()));
    h.tick();
    assert!(h.take_sent_op(OpCode::Rdm).is_empty());
}

#[test]
fn test_art_rdm_relayed_on_output_line() {
    let (mut h, line) = rdm_harness(&config_with(vec![rdm_output()]));
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.receive(&dmx(0x0001, &[1, 2]), CONTROLLER_A);
    h.take_sent();
    let stops_before = h.light.borrow().stops;

    let request = get_request(DEVICE_1);
    let response = request.response(DEVICE_1, vec![1, 2, 3]);
    line.borrow_mut().replies.push_back(response.encode());
    h.receive(&art_rdm(0x01, &request), CONTROLLER_B);

    assert_eq!(line.borrow().sent.last(), Some(&(0, request.encode())));
    let replies = h.take_sent_op(OpCode::Rdm);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, CONTROLLER_B);
    let packet = ArtRdm::decode(&replies[0].1).unwrap();
    assert_eq!(packet.rdm_packet, &response.encode()[1..]);

    assert!(h.light.borrow().stops > stops_before);
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));
    assert_eq!(h.node.output(0).unwrap().rdm_controller_ip, Some(CONTROLLER_B));
}

#[test]
fn test_art_rdm_without_response_sends_nothing() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.take_sent();
    h.receive(&art_rdm(0x01, &get_request(DEVICE_1)), CONTROLLER_B);
    assert!(h.take_sent_op(OpCode::Rdm).is_empty());
}

#[test]
fn test_art_rdm_response_sent_on_input_line() {
    let (mut h, line) = rdm_harness(&config_with(vec![input_port(0x0002)]));
    let request = get_request(DEVICE_1);

    h.receive(&art_rdm(0x02, &request), CONTROLLER_A);
    assert!(line.borrow().sent.is_empty());

    let response = request.response(DEVICE_1, vec![9]);
    h.receive(&art_rdm(0x02, &response), CONTROLLER_A);
    assert_eq!(line.borrow().sent, vec![(0, response.encode())]);
}

#[test]
fn test_tod_control_commands() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.take_sent();

    h.receive(&tod_control(0x01, TodControlCommand::IncOff), CONTROLLER_A);
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_ne!(flags & good_output_b::DISCOVERY_DISABLED, 0);
    assert_eq!(tod_packets(&h).len(), 1);

    h.receive(&tod_control(0x01, TodControlCommand::IncOn), CONTROLLER_A);
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_eq!(flags & good_output_b::DISCOVERY_DISABLED, 0);
    assert_eq!(tod_packets(&h).len(), 1);

    h.receive(&tod_control(0x01, TodControlCommand::Flush), CONTROLLER_A);
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_eq!(flags & good_output_b::DISCOVERY_NOT_RUNNING, 0);
    assert!(h.node.rdm().unwrap().is_running(0));
    assert!(tod_packets(&h).is_empty());

    // The flush packet itself advanced the pass by one step
    tick_n(&mut h, EMPTY_PASS_TICKS - 1);
    assert_eq!(tod_packets(&h).len(), 1);
}

#[test]
fn test_tod_control_end_stops_discovery() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    h.take_sent();
    h.receive(&tod_control(0x01, TodControlCommand::End), CONTROLLER_A);

    assert!(!h.node.rdm().unwrap().is_running(0));
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_ne!(flags & good_output_b::DISCOVERY_NOT_RUNNING, 0);
    assert_eq!(tod_packets(&h).len(), 1);

    tick_n(&mut h, EMPTY_PASS_TICKS * 2);
    assert!(tod_packets(&h).is_empty());
}

#[test]
fn test_background_cycle_runs_after_interval() {
    let config = NodeConfig {
        rdm_enabled: true,
        rdm_discovery_interval_secs: 1,
        ..config_with(vec![rdm_output()])
    };
    let (mut h, _line) = rdm_harness(&config);
    tick_n(&mut h, EMPTY_PASS_TICKS);
    assert_eq!(tod_packets(&h).len(), 1);
    assert!(!h.node.is_rdm_cycle_running());

    h.advance(999);
    h.tick();
    assert!(!h.node.is_rdm_cycle_running());

    h.advance(1);
    h.tick();
    assert!(h.node.is_rdm_cycle_running());

    let mut ticks = 0;
    while h.node.is_rdm_cycle_running() && ticks < 50 {
        h.tick();
        ticks += 1;
    }
    assert!(!h.node.is_rdm_cycle_running());
    assert_eq!(tod_packets(&h).len(), 1);
}

#[test]
fn test_background_cycle_skips_disabled_discovery() {
    let config = NodeConfig {
        rdm_enabled: true,
        rdm_discovery_interval_secs: 1,
        ..config_with(vec![rdm_output()])
    };
    let (mut h, _line) = rdm_harness(&config);
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.receive(&tod_control(0x01, TodControlCommand::IncOff), CONTROLLER_A);
    h.take_sent();

    h.advance(1_000);
    tick_n(&mut h, 10);
    assert!(!h.node.is_rdm_cycle_running());
    assert!(tod_packets(&h).is_empty());
    assert!(!h.node.rdm().unwrap().is_running(0));
}

fn cycle_config() -> NodeConfig {
    NodeConfig {
        rdm_enabled: true,
        rdm_discovery_interval_secs: 1,
        ..config_with(vec![rdm_output()])
    }
}

/// Transmitting output with a background pass just started on it
fn harness_in_background_pass() -> (Harness, Rc<RefCell<LineState>>) {
    let (mut h, line) = rdm_harness(&cycle_config());
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.receive(&dmx(0x0001, &[5, 6]), CONTROLLER_A);
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));

    h.advance(1_000);
    h.tick();
    assert!(h.node.is_rdm_cycle_running());
    assert!(h.node.rdm().unwrap().is_running(0));
    assert_eq!(h.light.borrow().running.get(&0), Some(&false));
    h.take_sent();
    (h, line)
}

fn assert_output_resumed(h: &mut Harness) {
    assert!(!h.node.is_rdm_cycle_running());
    assert!(!h.node.rdm().unwrap().is_running(0));
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));
    let flags = h.node.output(0).unwrap().good_output_b;
    assert_ne!(flags & good_output_b::DISCOVERY_NOT_RUNNING, 0);

    h.receive(&dmx(0x0001, &[7, 8]), CONTROLLER_A);
    assert_eq!(h.output(0), vec![7, 8]);
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));
}

#[test]
fn test_inc_off_during_background_pass_resumes_output() {
    let (mut h, _line) = harness_in_background_pass();
    h.receive(&tod_control(0x01, TodControlCommand::IncOff), CONTROLLER_A);
    tick_n(&mut h, 10);
    assert_output_resumed(&mut h);
}

#[test]
fn test_rdm_disable_during_background_pass_resumes_output() {
    let (mut h, _line) = harness_in_background_pass();
    h.node.set_rdm(0, false).unwrap();
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));
    tick_n(&mut h, 10);
    assert_output_resumed(&mut h);
}

#[test]
fn test_rdm_disable_during_full_discovery_resumes_output() {
    let (mut h, _line) = rdm_harness(&config_with(vec![rdm_output()]));
    tick_n(&mut h, EMPTY_PASS_TICKS);
    h.receive(&dmx(0x0001, &[5, 6]), CONTROLLER_A);
    h.receive(&tod_control(0x01, TodControlCommand::Flush), CONTROLLER_A);
    assert_eq!(h.light.borrow().running.get(&0), Some(&false));

    h.node.set_rdm(0, false).unwrap();
    assert!(!h.node.rdm().unwrap().is_running(0));
    assert_eq!(h.light.borrow().running.get(&0), Some(&true));
}
