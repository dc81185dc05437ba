use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use kipanel::Panelizer;
use kipanel_cli::{Args, run};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("kipanel")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn args(input: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        log_level: "off".to_string(),
        ..Args::default()
    }
}

#[test]
fn e2e_panelize_fixture() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("blinky.kicad_pcb");
    fs::copy(fixture("blinky.kicad_pcb"), &input).unwrap();

    let args = Args {
        numx: Some(2),
        numy: Some(2),
        hrail: Some(5.0),
        hrailtext: Some("kipanel".to_string()),
        shared_nets: vec!["GND".to_string()],
        ..args(&input)
    };
    run(&args).expect("panelizing the fixture should succeed");

    let output = temp_dir.path().join("blinky_panelized.kicad_pcb");
    let text = fs::read_to_string(&output).expect("panel should be written next to the input");

    let panel = Panelizer::default()
        .parse(&text)
        .expect("the panel should parse again");
    let footprints = panel.root().find_all("footprint").count();
    assert_eq!(footprints, 8);

    assert!(text.contains("generated with: kipanel --numx 2 --numy 2"));
    assert!(text.contains("(2x2 panel)"));
}

#[test]
fn e2e_explicit_output_and_envelope() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("out.kicad_pcb");

    let args = Args {
        output: Some(output.to_string_lossy().to_string()),
        panelx: Some(100.0),
        panely: Some(100.0),
        padding: Some(2.0),
        no_report: true,
        ..args(&fixture("blinky.kicad_pcb"))
    };
    run(&args).expect("panelizing the fixture should succeed");

    let text = fs::read_to_string(&output).unwrap();
    assert!(!text.contains("generated with"));
}

#[test]
fn e2e_error_cases() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let wrong_extension = temp_dir.path().join("blinky.txt");
    fs::copy(fixture("blinky.kicad_pcb"), &wrong_extension).unwrap();
    let err = run(&Args {
        numx: Some(1),
        numy: Some(1),
        ..args(&wrong_extension)
    })
    .unwrap_err();
    assert_eq!(err.exit_code(), 3);

    let broken = temp_dir.path().join("broken.kicad_pcb");
    fs::write(&broken, "(kicad_pcb (version 20221018)").unwrap();
    let err = run(&Args {
        numx: Some(1),
        numy: Some(1),
        ..args(&broken)
    })
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(
        !temp_dir.path().join("broken_panelized.kicad_pcb").exists(),
        "no output may be written for a failed run"
    );

    let missing = temp_dir.path().join("missing.kicad_pcb");
    let err = run(&Args {
        numx: Some(1),
        numy: Some(1),
        ..args(&missing)
    })
    .unwrap_err();
    assert_eq!(err.exit_code(), 1);

    let no_grid = run(&args(&fixture("blinky.kicad_pcb"))).unwrap_err();
    assert_eq!(no_grid.exit_code(), 3);
}
