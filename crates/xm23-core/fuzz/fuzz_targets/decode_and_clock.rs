#![no_main]

use libfuzzer_sys::fuzz_target;
use xm23_core::{disassemble_word, Decoder, Machine, MachineConfig, Space, TraceConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let word = u16::from_le_bytes([data[0], data[1]]);
    let _ = Decoder::decode(word);
    let _ = disassemble_word(0, word);

    let mut machine = Machine::with_config(&MachineConfig {
        breakpoint: None,
        trace: TraceConfig {
            enabled: true,
            capacity: 64,
        },
    });
    let program = &data[2..data.len().min(0x1002)];
    if machine.memory_mut(Space::Instruction).load(0, program).is_err() {
        return;
    }
    let _ = machine.memory_mut(Space::Data).load(0, program);

    for _ in 0..4096 {
        machine.advance();
    }
    assert_eq!(machine.state.registers.pc() % 2, 0);
});
