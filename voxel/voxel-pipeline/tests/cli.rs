//! The `mesh2voxel` binary, driven through real subprocesses.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use mesh_io::load_off;
use mesh_types::MeshBounds;
use tempfile::tempdir;
use xshell::{cmd, Shell};

const BIN: &str = env!("CARGO_BIN_EXE_mesh2voxel");

const CUBE_CORNERS: &str = "v -1 -1 -1\nv 3 -1 -1\nv 3 1 -1\nv -1 1 1\nf 1 2 3 4\n";

fn write_meshes(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), CUBE_CORNERS).unwrap();
    }
}

#[test]
fn convert_subcommand_writes_off_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("off");
    write_meshes(&input, &["one.obj", "two.obj"]);

    let sh = Shell::new().unwrap();
    cmd!(sh, "{BIN} convert {input} {output}").quiet().run().unwrap();

    let text = std::fs::read_to_string(output.join("one.off")).unwrap();
    assert!(text.starts_with("OFF\n4 1 0\n-1 -1 -1\n"));
    assert!(text.ends_with("4 0 1 2 3\n"));
    assert!(output.join("two.off").is_file());
}

#[test]
fn normalize_subcommand_fits_grid() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("scaled");
    write_meshes(&input, &["box.obj"]);

    let sh = Shell::new().unwrap();
    cmd!(
        sh,
        "{BIN} normalize {input} {output} --width 64 --height 32 --depth 32 --padding 0"
    )
    .quiet()
    .run()
    .unwrap();

    let bounds = load_off(output.join("box.off")).unwrap().bounds();
    // 4 x 2 x 2 into 64 x 32 x 32: x and y both limit at 16
    approx::assert_relative_eq!(bounds.size().x, 64.0, epsilon = 1e-9);
    approx::assert_relative_eq!(bounds.size().y, 32.0, epsilon = 1e-9);
}

#[test]
fn bad_dims_are_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    write_meshes(&input, &["a.obj"]);

    let sh = Shell::new().unwrap();
    let output = cmd!(sh, "{BIN} {input} --dims 32x0x32")
        .quiet()
        .ignore_status()
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least 1"));
}

#[cfg(unix)]
#[test]
fn full_run_with_script_stages() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let input = dir.path().join("meshes");
    write_meshes(&input, &["b.obj", "a.obj", "c.OBJ"]);

    // occ --input DIR --output FILE ...: list the inputs as the container
    let voxelizer = dir.path().join("voxelize.sh");
    std::fs::write(&voxelizer, "#!/bin/sh\nLC_ALL=C ls \"$3\" > \"$5\"\n").unwrap();
    std::fs::set_permissions(&voxelizer, std::fs::Permissions::from_mode(0o755)).unwrap();

    // H5 OUT: one result per container line, named by position
    let extractor = dir.path().join("extract.sh");
    std::fs::write(
        &extractor,
        "i=0\nwhile read -r name; do printf '%s' \"$name\" > \"$2/$i.npy\"; i=$((i+1)); done < \"$1\"\n",
    )
    .unwrap();

    let sh = Shell::new().unwrap();
    cmd!(
        sh,
        "{BIN} {input} --dims 8x8x8 --voxelizer {voxelizer} --extractor sh {extractor}"
    )
    .quiet()
    .run()
    .unwrap();

    let out = dir.path().join("output");
    for base in ["a", "b", "c"] {
        let content = std::fs::read_to_string(out.join(format!("{base}.npy"))).unwrap();
        assert_eq!(content, format!("{base}.off"));
    }
    assert!(!dir.path().join("input_off").exists());
    assert!(!dir.path().join("voxels.h5").exists());
}

#[cfg(unix)]
#[test]
fn failing_stage_is_named_in_the_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("meshes");
    write_meshes(&input, &["a.obj"]);

    let sh = Shell::new().unwrap();
    let output = cmd!(sh, "{BIN} {input} --voxelizer false --keep-intermediates")
        .quiet()
        .ignore_status()
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pipeline failed in rasterize"), "{stderr}");
    assert!(!stderr.contains("Aborted"), "{stderr}");
    // the built-in stages ran through this binary
    assert!(dir.path().join("input_scaled").join("a.off").exists());
}
