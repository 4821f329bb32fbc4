//! Build directory generation with a scripted `gn`.

use std::path::Path;

use pi_util_core::fakes::ScriptedExecutor;
use pi_util_core::{
    load_gyp_variables, GnGenerator, GnSettings, GnTarget, PiUtilError, ToolConfig,
};

fn write_templates(root: &Path) {
    std::fs::create_dir_all(root.join("pi-util")).unwrap();
    std::fs::write(
        root.join("pi-util/defargs_armv6.gn"),
        "target_cpu = \"arm\"\narm_version = 6\n",
    )
    .unwrap();
    std::fs::write(
        root.join("pi-util/defargs_armv7.gn"),
        "target_cpu = \"arm\"\narm_version = 7\n",
    )
    .unwrap();
}

#[test]
fn generates_both_targets_with_credentials() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_templates(root);

    let gypi = root.join("include.gypi");
    std::fs::write(
        &gypi,
        "{\n  'variables': {\n    'google_api_key': 'AIzaKey',\n    \
         'google_default_client_id': 'client.apps',\n    \
         'google_default_client_secret': 's3cret',\n  },\n}\n",
    )
    .unwrap();
    let variables = load_gyp_variables(&gypi).unwrap().unwrap();

    let tools = ToolConfig::standard();
    let exec = ScriptedExecutor::new();
    let generator = GnGenerator::new(root, "gngen", &tools, &exec);
    let settings =
        GnSettings::from_variables(&variables, generator.default_sysroot().to_string_lossy());

    let written = generator
        .generate_all(&GnTarget::defaults(), &settings)
        .unwrap();
    assert_eq!(written.len(), 2);

    let armv7 = std::fs::read_to_string(root.join("out/armv7/args.gn")).unwrap();
    let sysroot = root.join("build/linux/raspian_stretch_pi1-sysroot");
    assert_eq!(
        armv7,
        format!(
            "# -- copied from: pi-util/defargs_armv7.gn\n\
             target_cpu = \"arm\"\n\
             arm_version = 7\n\
             # -- created by gngen\n\
             target_sysroot = \"{}\"\n\
             google_api_key = \"AIzaKey\"\n\
             google_default_client_id = \"client.apps\"\n\
             google_default_client_secret = \"s3cret\"\n",
            sysroot.display()
        )
    );

    let calls = exec.calls_to("gn");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].argv(), vec!["gn", "gen", "out/armv6"]);
    assert_eq!(calls[1].argv(), vec!["gn", "gen", "out/armv7"]);
    assert_eq!(calls[0].cwd, root);
}

#[test]
fn existing_output_directory_is_reused() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_templates(root);
    std::fs::create_dir_all(root.join("out/armv6")).unwrap();
    std::fs::write(root.join("out/armv6/args.gn"), "stale").unwrap();

    let tools = ToolConfig::standard();
    let exec = ScriptedExecutor::new();
    let generator = GnGenerator::new(root, "gngen", &tools, &exec);
    generator
        .generate(&GnTarget::new("armv6"), &GnSettings::default())
        .unwrap();

    let args = std::fs::read_to_string(root.join("out/armv6/args.gn")).unwrap();
    assert!(args.starts_with("# -- copied from: pi-util/defargs_armv6.gn\n"));
    assert!(args.contains("google_api_key = \"\"\n"));
}

#[test]
fn gn_failure_aborts_remaining_targets() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_templates(root);

    let tools = ToolConfig::standard();
    let exec = ScriptedExecutor::new().with_exit("gn", 1);
    let generator = GnGenerator::new(root, "gngen", &tools, &exec);

    let err = generator
        .generate_all(&GnTarget::defaults(), &GnSettings::default())
        .unwrap_err();
    match &err {
        PiUtilError::ToolExited { tool, code, cwd } => {
            assert_eq!(tool, "gn");
            assert_eq!(*code, 1);
            assert_eq!(cwd, root);
        }
        other => panic!("expected ToolExited, got {other:?}"),
    }
    assert_eq!(exec.calls_to("gn").len(), 1);
    assert!(!root.join("out/armv7").exists());
}

#[test]
fn non_utf8_template_is_copied_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("pi-util")).unwrap();
    std::fs::write(
        root.join("pi-util/defargs_armv6.gn"),
        b"# maintainer: Fran\xe7ois\narm_version = 6\n",
    )
    .unwrap();

    let tools = ToolConfig::standard();
    let exec = ScriptedExecutor::new();
    let generator = GnGenerator::new(root, "gngen", &tools, &exec);
    generator
        .generate(&GnTarget::new("armv6"), &GnSettings::default())
        .unwrap();

    let args = std::fs::read(root.join("out/armv6/args.gn")).unwrap();
    assert!(args.starts_with(
        b"# -- copied from: pi-util/defargs_armv6.gn\n# maintainer: Fran\xe7ois\narm_version = 6\n# -- created by gngen\n"
    ));
    assert_eq!(exec.calls_to("gn").len(), 1);
}

#[test]
fn missing_template_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let tools = ToolConfig::standard();
    let exec = ScriptedExecutor::new();
    let generator = GnGenerator::new(tmp.path(), "gngen", &tools, &exec);

    let err = generator
        .generate(&GnTarget::new("armv6"), &GnSettings::default())
        .unwrap_err();
    assert!(matches!(err, PiUtilError::Io(_)));
    assert!(exec.calls().is_empty());
}
