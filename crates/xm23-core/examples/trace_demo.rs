//! Runs a small block-copy program to a breakpoint, then prints the pipeline
//! trace and a disassembly window around the stop address.
//!
//! `RUST_LOG=debug cargo run --example trace_demo` also shows decoder and
//! scheduler diagnostics.

use std::sync::atomic::AtomicBool;

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use xm23_core::{disassemble_window, Machine, MachineConfig, Space, TraceConfig};

const ORIGIN: u16 = 0x0100;
const STOP: u16 = 0x0112;

const PROGRAM: [u16; 10] = [
    0x6801, // MOVLZ #0,R1
    0x7809, // MOVH #1,R1
    0x6802, // MOVLZ #0,R2
    0x7812, // MOVH #2,R2
    0x681B, // MOVLZ #3,R3
    0x5888, // LD R1+,R0
    0x5C82, // ST R0,R2+
    0x428B, // SUB #1,R3
    0x27FC, // BNE $-8
    0x4C00, // MOV R0,R0
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut machine = Machine::with_config(&MachineConfig {
        breakpoint: Some(STOP),
        trace: TraceConfig {
            enabled: true,
            capacity: 64,
        },
    });
    let image: Vec<u8> = PROGRAM.iter().flat_map(|word| word.to_le_bytes()).collect();
    machine
        .memory_mut(Space::Instruction)
        .load(ORIGIN, &image)
        .expect("program fits");
    let source = [0xCAFE_u16, 0xBEEF, 0xF00D];
    for (address, value) in (ORIGIN..).step_by(2).zip(source) {
        machine.memory_mut(Space::Data).write_word(address, value);
    }
    machine.set_register(7, ORIGIN).expect("PC is register 7");

    let outcome = machine.run(&AtomicBool::new(false), 10_000);
    tracing::info!(
        "Stopped after {} ticks ({:?}) at clock {}",
        outcome.ticks,
        outcome.stop,
        machine.clock()
    );

    println!("-- trace --");
    for record in machine.trace() {
        println!("{record}");
    }

    println!("-- disassembly --");
    for row in disassemble_window(machine.memory(Space::Instruction), STOP, 6, 1) {
        let marker = if Some(row.address) == machine.breakpoint() { '*' } else { ' ' };
        println!("{marker} {row}");
    }

    println!("-- copied --");
    let data = machine.memory(Space::Data);
    for address in (0x0200_u16..0x0206).step_by(2) {
        println!("{address:04X}: {:04X}", data.read_word(address));
    }
}
