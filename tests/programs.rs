use std::path::{Path, PathBuf};

use vector_vm::{Error, Kind, Program, TimeZone, Value, Vm, VmConfig};

fn program(name: &str) -> Program {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-data/programs")
        .join(name);
    Program::load(&path).unwrap_or_else(|error| panic!("{}: {}", path.display(), error))
}

#[test]
fn successful_programs() {
    let cases = [
        ("or.json", Value::Integer(1)),
        ("and_text.toml", Value::Integer(0)),
        ("hello.yaml", Value::from("hello")),
        ("discard.json", Value::Integer(5)),
        ("after_end.json", Value::from_f64(0.5).unwrap()),
    ];

    let mut vm = Vm::new();
    for (name, expected) in cases {
        assert_eq!(vm.run(&program(name)), Ok(expected), "{name}");
    }
}

#[test]
fn failing_programs() {
    let cases = [
        (
            "invalid_opcode.json",
            Error::InvalidOpcode {
                opcode: 200,
                position: 1,
            },
            1,
        ),
        (
            "timestamp_or.toml",
            Error::UnsupportedOperation {
                operation: "or",
                kind: Kind::Timestamp,
            },
            0,
        ),
        (
            "underflow.yaml",
            Error::StackUnderflow {
                needed: 2,
                available: 1,
            },
            1,
        ),
    ];

    let mut vm = Vm::new();
    for (name, expected, depth) in cases {
        assert_eq!(vm.run(&program(name)), Err(expected), "{name}");
        assert_eq!(vm.stack().len(), depth, "{name}");
    }
}

#[test]
fn config_file() {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "test-data", "vm.toml"]
        .iter()
        .collect();
    let config = VmConfig::load(path).unwrap();

    assert_eq!(config.timezone, TimeZone::Named(chrono_tz::UTC));
    assert!(!config.strict_result);

    let program = Program::builder()
        .push_constant(1)
        .push_constant(2)
        .build();
    assert_eq!(Vm::with_config(&config).run(&program), Ok(Value::Integer(2)));
    assert_eq!(
        Vm::new().run(&program),
        Err(Error::UnbalancedStack { depth: 2 })
    );
}
