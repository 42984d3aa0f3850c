//! Test driver: runs every `*.hex` program in a directory against a fresh core and reports a
//! PASS/FAIL/TIMEOUT/FATAL summary, with a diagnostic register/CSR dump on anything but PASS.

use clap::Parser;
use log::warn;
use rv32i_core::bus::{Bus, RAM_BASE};
use rv32i_core::core::csr;
use rv32i_core::core::{Cpu, RunOutcome, DEFAULT_MAX_CYCLES};
use rv32i_core::registers::Specifier;
use std::path::PathBuf;

const DEFAULT_TEST_DIR: &str = "tests/compliance";

const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory to scan for `*.hex` test programs.
    #[arg(default_value = DEFAULT_TEST_DIR)]
    test_dir: PathBuf,

    /// Cycle budget per test before a run is classified as TIMEOUT.
    #[arg(long, default_value_t = DEFAULT_MAX_CYCLES)]
    max_cycles: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut entries: Vec<PathBuf> = match std::fs::read_dir(&args.test_dir) {
        Ok(dir) => dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "hex"))
            .collect(),
        Err(error) => {
            eprintln!(
                "could not read test directory {:?}: {error}",
                args.test_dir
            );
            return;
        }
    };
    entries.sort();

    let mut pass = 0;
    let mut fail = 0;
    for path in &entries {
        let name = path.file_stem().unwrap_or_default().to_string_lossy();
        let mut bus = Bus::new();
        if let Err(error) = rv32i_loader::load_file(&mut bus, path, RAM_BASE) {
            warn!("skipping {name}: {error}");
            continue;
        }
        let mut cpu = Cpu::new(bus);
        let outcome = cpu.run(args.max_cycles);
        if outcome.is_pass() {
            pass += 1;
            println!("PASS {name}");
        } else {
            fail += 1;
            println!("FAIL {name}: {}", describe(&outcome));
            print_diagnostics(&name, &cpu, &outcome);
        }
    }

    println!("\n{pass} passed, {fail} failed, {} total", pass + fail);
}

fn describe(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::HaltPass => "pass".to_string(),
        RunOutcome::HaltFail(code) => format!("tohost code {code:#x}"),
        RunOutcome::Timeout => "timeout".to_string(),
        RunOutcome::Fatal(error) => format!("fatal: {error}"),
    }
}

/// Classification of how a non-PASS run ended, per the driver's diagnostic requirements.
fn classify(cpu: &Cpu, outcome: &RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Timeout => "timeout",
        RunOutcome::Fatal(_) => "decode fault",
        RunOutcome::HaltPass | RunOutcome::HaltFail(_) => {
            if cpu.ecall_trapped() {
                "ecall trap"
            } else {
                "direct tohost"
            }
        }
    }
}

fn print_diagnostics(name: &str, cpu: &Cpu, outcome: &RunOutcome) {
    println!("--- diagnostics for {name} ---");
    println!("cycles:         {}", cpu.cycle());
    println!("classification: {}", classify(cpu, outcome));
    println!("final pc:       {:#010x}", cpu.registers().pc());
    for i in 0..32 {
        let specifier = Specifier::from_u5(i as u8);
        let value = cpu.registers().x(specifier);
        println!(
            "x{i:<2} ({:<4}) = {value:#010x} ({})",
            ABI_NAMES[i], value as i32
        );
    }
    let csr = cpu.csr();
    println!("mstatus: {:#010x}", csr.read(csr::MSTATUS));
    println!("mepc:    {:#010x}", csr.mepc());
    println!("mcause:  {:#010x}", csr.read(csr::MCAUSE));
    println!("mtvec:   {:#010x}", csr.mtvec());
    println!("mie:     {:#010x}", csr.read(csr::MIE));
}
