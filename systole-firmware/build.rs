//! Build script for systole-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates systole.toml at compile time
//! - Generates `programs.rs` with one constant set per program
//!
//! Range checks that depend on derived tick counts (pulse fits in the
//! cycle, slots fit in the cycle) are left to `Program::derive`, which the
//! generated constants evaluate at compile time.

use std::collections::BTreeSet;
use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// System clock feeding the PWM slices
const SYS_CLOCK_HZ: u64 = 125_000_000;

/// Largest period a 16-bit PWM counter can hold
const MAX_PERIOD: u64 = 65_535;

/// Programs that have a binary; each needs a `[program.<name>]` table
const PROGRAMS: [&str; 3] = ["breathing", "heartbeat-leds", "servo-heartbeat"];

/// Number of user GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    let config = load_config();

    let fault_led = validate_board(&config);
    let eyelid = validate_eyelid(&config);
    let programs = validate_programs(&config, fault_led);

    generate(fault_led, &eyelid, &programs);

    println!("cargo:warning=systole.toml validated successfully");
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse systole.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=systole.toml");

    let config_path = Path::new("systole.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: systole.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a systole.toml configuration file.        ║\n\
            ║  Please create one in the systole-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read systole.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in systole.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a boxed list of errors for one section
fn abort(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Abort if a section collected any errors
fn check(title: &str, errors: &[String]) {
    if !errors.is_empty() {
        abort(title, errors);
    }
}

/// Read a required integer within `min..=max`
fn require_int(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            min
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            min
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            min
        }
    }
}

/// Read an optional integer within `min..=max`
fn optional_int(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    default: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    if table.contains_key(key) {
        require_int(table, section, key, 0, max, errors)
    } else {
        default
    }
}

/// Read a required float; integers are accepted
fn require_float(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> f32 {
    match table.get(key) {
        Some(toml::Value::Float(v)) => *v as f32,
        Some(toml::Value::Integer(v)) => *v as f32,
        Some(_) => {
            errors.push(format!("[{}] {} must be a number", section, key));
            0.0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0.0
        }
    }
}

/// Smallest integer PWM divider that fits one frame in a 16-bit counter
fn pwm_divider(frame_rate_hz: u64) -> Option<u64> {
    (1..=255).find(|d| SYS_CLOCK_HZ % d == 0 && SYS_CLOCK_HZ / d / frame_rate_hz <= MAX_PERIOD)
}

/// Duty percentages shared by the eyelid and the programs
fn check_duty(section: &str, min: i64, max: i64, errors: &mut Vec<String>) {
    if min > max {
        errors.push(format!("[{}] min_percent must not exceed max_percent", section));
    }
}

/// Validate the board section, returning the fault LED pin if any
fn validate_board(config: &toml::Value) -> Option<i64> {
    let board = match config.get("board") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            abort("Invalid board configuration", &["[board] must be a table".into()]);
        }
        None => return None,
    };

    let mut errors = Vec::new();
    let fault_led = board
        .contains_key("fault_led")
        .then(|| require_int(board, "board", "fault_led", 0, GPIO_COUNT - 1, &mut errors));

    check("Invalid board configuration", &errors);
    fault_led
}

/// Validated `[eyelid]` values
struct Eyelid {
    servo: i64,
    button: i64,
    divider: u64,
    frame_rate_hz: i64,
    min_percent: i64,
    max_percent: i64,
    overflow_hz: i64,
    time_to_open_ms: i64,
}

/// Validate the eyelid section
fn validate_eyelid(config: &toml::Value) -> Eyelid {
    let mut errors = Vec::new();

    let eyelid = match config.get("eyelid") {
        Some(toml::Value::Table(t)) => t,
        _ => {
            abort(
                "Missing required sections in systole.toml",
                &["Missing [eyelid] section".into()],
            );
        }
    };

    let frame_rate_hz = require_int(eyelid, "eyelid", "frame_rate_hz", 1, 1000, &mut errors);
    let min_percent = require_int(eyelid, "eyelid", "min_percent", 0, 100, &mut errors);
    let max_percent = require_int(eyelid, "eyelid", "max_percent", 0, 100, &mut errors);
    let overflow_hz = require_int(eyelid, "eyelid", "overflow_hz", 1, 100_000, &mut errors);
    let time_to_open_ms = require_int(eyelid, "eyelid", "time_to_open_ms", 1, 60_000, &mut errors);
    let servo = require_int(eyelid, "eyelid", "servo", 0, GPIO_COUNT - 1, &mut errors);
    let button = require_int(eyelid, "eyelid", "button", 0, GPIO_COUNT - 1, &mut errors);
    check_duty("eyelid", min_percent, max_percent, &mut errors);

    // Even GPIOs are channel A of slice (n / 2) % 8
    if servo % 2 != 0 {
        errors.push(format!(
            "[eyelid] servo GPIO{} is a PWM channel B pin; use an even GPIO",
            servo
        ));
    }
    if button == servo {
        errors.push(format!("[eyelid] servo and button are both GPIO{}", servo));
    }

    let divider = pwm_divider(frame_rate_hz as u64).unwrap_or_else(|| {
        errors.push("[eyelid] frame_rate_hz too low for a 16-bit PWM counter".into());
        1
    });

    check("Invalid eyelid configuration", &errors);

    Eyelid {
        servo,
        button,
        divider,
        frame_rate_hz,
        min_percent,
        max_percent,
        overflow_hz,
        time_to_open_ms,
    }
}

/// Validated `[program.<name>]` values
struct Program {
    name: &'static str,
    divider: u64,
    frame_rate_hz: i64,
    bpm: i64,
    min_percent: i64,
    max_percent: i64,
    waveform: String,
    policy: String,
    pins: Vec<i64>,
    margin_ticks: i64,
    tolerance_ticks: i64,
}

/// Validate every program table
fn validate_programs(config: &toml::Value, fault_led: Option<i64>) -> Vec<Program> {
    let tables = match config.get("program") {
        Some(toml::Value::Table(t)) => t,
        _ => {
            abort(
                "Missing required sections in systole.toml",
                &["Missing [program.*] section - every program needs a table".into()],
            );
        }
    };

    let mut errors = Vec::new();
    let mut programs = Vec::new();

    for name in tables.keys() {
        if !PROGRAMS.contains(&name.as_str()) {
            errors.push(format!("[program.{}] is not a known program", name));
        }
    }

    for name in PROGRAMS {
        let section = format!("program.{}", name);
        let program = match tables.get(name) {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
            None => {
                errors.push(format!("Missing [{}] section", section));
                continue;
            }
        };

        let frame_rate_hz = require_int(program, &section, "frame_rate_hz", 1, 1000, &mut errors);
        let bpm = require_int(program, &section, "bpm", 1, 600, &mut errors);
        let min_percent = require_int(program, &section, "min_percent", 0, 100, &mut errors);
        let max_percent = require_int(program, &section, "max_percent", 0, 100, &mut errors);
        check_duty(&section, min_percent, max_percent, &mut errors);
        let margin_ticks = optional_int(program, &section, "margin_ticks", 2000, MAX_PERIOD as i64, &mut errors);
        let tolerance_ticks =
            optional_int(program, &section, "tolerance_ticks", 64, MAX_PERIOD as i64, &mut errors);

        let waveform = match program.get("waveform").and_then(|w| w.as_str()) {
            Some("sine_breathing") => {
                let offset = require_float(program, &section, "offset", &mut errors);
                format!("Waveform::SineBreathing {{ offset: {:?} }}", offset)
            }
            Some("sharpened_sine") => {
                let stagger = require_float(program, &section, "stagger", &mut errors);
                let exponent = require_int(program, &section, "exponent", 0, 8, &mut errors);
                format!(
                    "Waveform::SharpenedSine {{ stagger: {:?}, exponent: {} }}",
                    stagger, exponent
                )
            }
            Some("cosine_ease") => "Waveform::CosineEase".to_string(),
            _ => {
                errors.push(format!(
                    "[{}] waveform must be 'sine_breathing', 'sharpened_sine', or 'cosine_ease'",
                    section
                ));
                String::new()
            }
        };

        let policy = match program.get("policy").and_then(|p| p.as_str()) {
            Some("dual_slope") => "PolicyConfig::DualSlope".to_string(),
            Some("single_slope") => "PolicyConfig::SingleSlope".to_string(),
            Some("sequential") => {
                let between_us = require_int(program, &section, "between_us", 1, 1_000_000, &mut errors);
                format!("PolicyConfig::Sequential {{ between_us: {} }}", between_us)
            }
            _ => {
                errors.push(format!(
                    "[{}] policy must be 'dual_slope', 'single_slope', or 'sequential'",
                    section
                ));
                String::new()
            }
        };

        let pins = validate_pins(program, &section, fault_led, &mut errors);

        let divider = pwm_divider(frame_rate_hz as u64).unwrap_or_else(|| {
            errors.push(format!("[{}] frame_rate_hz too low for a 16-bit PWM counter", section));
            1
        });

        programs.push(Program {
            name,
            divider,
            frame_rate_hz,
            bpm,
            min_percent,
            max_percent,
            waveform,
            policy,
            pins,
            margin_ticks,
            tolerance_ticks,
        });
    }

    check("Invalid program configuration", &errors);
    programs
}

/// Validate a program's output pin list
fn validate_pins(
    program: &toml::value::Table,
    section: &str,
    fault_led: Option<i64>,
    errors: &mut Vec<String>,
) -> Vec<i64> {
    let list = match program.get("pins") {
        Some(toml::Value::Array(list)) => list,
        Some(_) => {
            errors.push(format!("[{}] pins must be an array", section));
            return Vec::new();
        }
        None => {
            errors.push(format!("[{}] missing 'pins'", section));
            return Vec::new();
        }
    };

    if list.is_empty() || list.len() > u8::MAX as usize {
        errors.push(format!("[{}] pins must list 1-255 GPIOs", section));
    }

    let mut seen = BTreeSet::new();
    let mut pins = Vec::new();
    for pin in list {
        match pin.as_integer() {
            Some(pin) if (0..GPIO_COUNT).contains(&pin) => {
                if !seen.insert(pin) {
                    errors.push(format!("[{}] GPIO{} listed twice", section, pin));
                }
                if fault_led == Some(pin) {
                    errors.push(format!("[{}] GPIO{} is the fault LED", section, pin));
                }
                pins.push(pin);
            }
            _ => errors.push(format!("[{}] pins must be GPIO numbers 0-29", section)),
        }
    }
    pins
}

/// Module name for a program
fn module_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Write `programs.rs` into OUT_DIR
fn generate(fault_led: Option<i64>, eyelid: &Eyelid, programs: &[Program]) {
    if let Some(led) = fault_led {
        if led == eyelid.servo || led == eyelid.button {
            println!("cargo:warning=fault_led GPIO{} is also wired by the eyelid binary", led);
        }
    }

    let mut out = String::new();
    out.push_str("// Generated by build.rs from systole.toml. Do not edit.\n\n");
    out.push_str("use systole_core::config::{EaseConfig, EaseTiming, PolicyConfig, Program, ProgramConfig};\n");
    out.push_str("use systole_core::waveform::Waveform;\n");
    out.push_str("use embassy_rp::Peripherals;\n");
    out.push_str("use systole_hal_rp2040::{PinBank, PinError, ServoPwm};\n\n");
    out.push_str("use crate::board::LedPin;\n\n");
    out.push_str("/// System clock feeding the PWM slices\n");
    let _ = writeln!(out, "pub const SYS_CLOCK_HZ: u32 = {};\n", SYS_CLOCK_HZ);

    out.push_str("/// GPIO latched high on the first timing overrun\n");
    match fault_led {
        Some(pin) => {
            let _ = writeln!(out, "pub const FAULT_LED: Option<u8> = Some({});\n", pin);
        }
        None => out.push_str("pub const FAULT_LED: Option<u8> = None;\n\n"),
    }

    let banked = (0..GPIO_COUNT)
        .map(|pin| {
            if pin == eyelid.servo {
                "None".to_string()
            } else {
                format!("Some(p.PIN_{}.into())", pin)
            }
        })
        .collect::<Vec<_>>()
        .join(",\n            ");

    let _ = writeln!(
        out,
        "pub mod eyelid {{\n\
        \x20   use super::*;\n\n\
        \x20   pub const SERVO: u8 = {servo};\n\
        \x20   pub const BUTTON: u8 = {button};\n\
        \x20   pub const PWM_DIVIDER: u8 = {divider};\n\n\
        \x20   pub const CONFIG: EaseConfig = EaseConfig {{\n\
        \x20       counter_hz: SYS_CLOCK_HZ / PWM_DIVIDER as u32,\n\
        \x20       frame_rate_hz: {frame_rate_hz},\n\
        \x20       min_percent: {min_percent},\n\
        \x20       max_percent: {max_percent},\n\
        \x20       overflow_hz: {overflow_hz},\n\
        \x20       time_to_open_ms: {time_to_open_ms},\n\
        \x20   }};\n\n\
        \x20   pub const TIMING: EaseTiming = EaseTiming::derive(&CONFIG);\n\n\
        \x20   /// Start the servo at the closed position and bank every other GPIO\n\
        \x20   pub fn split(p: Peripherals) -> (ServoPwm, PinBank) {{\n\
        \x20       let servo = ServoPwm::new(\n\
        \x20           p.PWM_SLICE{slice},\n\
        \x20           p.PIN_{servo},\n\
        \x20           TIMING.period,\n\
        \x20           PWM_DIVIDER,\n\
        \x20           TIMING.min_ticks,\n\
        \x20       );\n\
        \x20       let bank = PinBank::from_pins([\n\
        \x20           {banked},\n\
        \x20       ]);\n\
        \x20       (servo, bank)\n\
        \x20   }}\n\
        }}\n",
        servo = eyelid.servo,
        button = eyelid.button,
        slice = (eyelid.servo / 2) % 8,
        divider = eyelid.divider,
        frame_rate_hz = eyelid.frame_rate_hz,
        min_percent = eyelid.min_percent,
        max_percent = eyelid.max_percent,
        overflow_hz = eyelid.overflow_hz,
        time_to_open_ms = eyelid.time_to_open_ms,
        banked = banked,
    );

    for program in programs {
        let takes = program
            .pins
            .iter()
            .map(|pin| format!("bank.take_output({})?", pin))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            out,
            "pub mod {module} {{\n\
            \x20   use super::*;\n\n\
            \x20   pub const CHANNELS: usize = {channels};\n\
            \x20   pub const PWM_DIVIDER: u8 = {divider};\n\n\
            \x20   pub const CONFIG: ProgramConfig = ProgramConfig {{\n\
            \x20       counter_hz: SYS_CLOCK_HZ / PWM_DIVIDER as u32,\n\
            \x20       frame_rate_hz: {frame_rate_hz},\n\
            \x20       bpm: {bpm},\n\
            \x20       min_percent: {min_percent},\n\
            \x20       max_percent: {max_percent},\n\
            \x20       waveform: {waveform},\n\
            \x20       policy: {policy},\n\
            \x20       channels: CHANNELS as u8,\n\
            \x20       margin_ticks: {margin_ticks},\n\
            \x20       tolerance_ticks: {tolerance_ticks},\n\
            \x20   }};\n\n\
            \x20   pub const PROGRAM: Program = Program::derive(&CONFIG);\n\n\
            \x20   /// Output pins in channel order\n\
            \x20   pub fn output_pins(bank: &mut PinBank) -> Result<[LedPin; CHANNELS], PinError> {{\n\
            \x20       Ok([{takes}])\n\
            \x20   }}\n\
            }}\n",
            module = module_name(program.name),
            channels = program.pins.len(),
            divider = program.divider,
            frame_rate_hz = program.frame_rate_hz,
            bpm = program.bpm,
            min_percent = program.min_percent,
            max_percent = program.max_percent,
            waveform = program.waveform,
            policy = program.policy,
            margin_ticks = program.margin_ticks,
            tolerance_ticks = program.tolerance_ticks,
            takes = takes,
        );
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("programs.rs"), out).unwrap();
}
