//! GN build directory generation for the Raspberry Pi targets.
//!
//! For each target, `out/<name>/args.gn` is assembled from the template
//! `pi-util/defargs_<name>.gn` plus the sysroot and the Google API
//! credentials, then `gn gen out/<name>` is run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::command::{CommandExecutor, Invocation};
use crate::config::ToolConfig;
use crate::error::{PiUtilError, Result};
use crate::literal::parse_literal;

/// Target names generated by default, in order.
pub const DEFAULT_TARGETS: [&str; 2] = ["armv6", "armv7"];

/// Sysroot location relative to the primary repository.
pub const DEFAULT_SYSROOT: &str = "build/linux/raspian_stretch_pi1-sysroot";

/// Name of the generated settings file inside each output directory.
pub const ARGS_FILE: &str = "args.gn";

/// One build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GnTarget {
    pub name: String,
}

impl GnTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_TARGETS.iter().map(|n| Self::new(*n)).collect()
    }

    /// Template args file, relative to the root.
    pub fn template_path(&self) -> PathBuf {
        Path::new("pi-util").join(format!("defargs_{}.gn", self.name))
    }

    /// Output directory, relative to the root.
    pub fn output_dir(&self) -> PathBuf {
        Path::new("out").join(&self.name)
    }
}

/// Values injected after the template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GnSettings {
    pub target_sysroot: String,
    pub google_api_key: String,
    pub google_default_client_id: String,
    pub google_default_client_secret: String,
}

impl GnSettings {
    /// Pick the credentials out of gyp `variables`; absent keys stay empty.
    pub fn from_variables(variables: &Map<String, Value>, target_sysroot: impl Into<String>) -> Self {
        let get = |key: &str| match variables.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Self {
            target_sysroot: target_sysroot.into(),
            google_api_key: get("google_api_key"),
            google_default_client_id: get("google_default_client_id"),
            google_default_client_secret: get("google_default_client_secret"),
        }
    }

    /// `key = "value"` pairs in the order they are written.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("target_sysroot", self.target_sysroot.as_str()),
            ("google_api_key", self.google_api_key.as_str()),
            ("google_default_client_id", self.google_default_client_id.as_str()),
            (
                "google_default_client_secret",
                self.google_default_client_secret.as_str(),
            ),
        ]
    }
}

/// `~/.gyp/include.gypi`, if a home directory is known.
pub fn gyp_include_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gyp").join("include.gypi"))
}

/// Read the `variables` mapping from a gyp include file.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_gyp_variables(path: &Path) -> Result<Option<Map<String, Value>>> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match parse_literal(&source)? {
        Value::Object(mut root) => match root.remove("variables") {
            Some(Value::Object(variables)) => Ok(Some(variables)),
            _ => Err(PiUtilError::MissingVariables {
                path: path.to_path_buf(),
            }),
        },
        _ => Err(PiUtilError::MissingVariables {
            path: path.to_path_buf(),
        }),
    }
}

/// Assemble the contents of `args.gn`.
///
/// The template body is copied byte for byte. Values are written verbatim
/// between double quotes.
pub fn render_args(
    template_src: &str,
    template_body: &[u8],
    generator: &str,
    settings: &GnSettings,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(template_body.len() + 256);
    out.extend_from_slice(format!("# -- copied from: {template_src}\n").as_bytes());
    out.extend_from_slice(template_body);
    if !template_body.is_empty() && !template_body.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(format!("# -- created by {generator}\n").as_bytes());
    for (key, value) in settings.pairs() {
        out.extend_from_slice(format!("{key} = \"{value}\"\n").as_bytes());
    }
    out
}

/// Create `dir` and its parents. An existing directory is fine; anything
/// else (permissions, a file in the way) is an error.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Generates build directories under `root` (the primary repository).
pub struct GnGenerator<'a> {
    root: PathBuf,
    generator: String,
    tools: &'a ToolConfig,
    executor: &'a dyn CommandExecutor,
}

impl<'a> GnGenerator<'a> {
    /// `generator` is recorded in the provenance comment.
    pub fn new(
        root: impl Into<PathBuf>,
        generator: impl Into<String>,
        tools: &'a ToolConfig,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            root: root.into(),
            generator: generator.into(),
            tools,
            executor,
        }
    }

    /// `<root>/build/linux/raspian_stretch_pi1-sysroot`.
    pub fn default_sysroot(&self) -> PathBuf {
        self.root.join(DEFAULT_SYSROOT)
    }

    /// Write `out/<name>/args.gn` and run `gn gen out/<name>`.
    ///
    /// Returns the path of the written args file.
    pub fn generate(&self, target: &GnTarget, settings: &GnSettings) -> Result<PathBuf> {
        let out_dir = target.output_dir();
        ensure_output_dir(&self.root.join(&out_dir))?;

        let template = target.template_path();
        let body = std::fs::read(self.root.join(&template))?;
        let contents = render_args(
            &template.to_string_lossy(),
            &body,
            &self.generator,
            settings,
        );

        let args_path = self.root.join(&out_dir).join(ARGS_FILE);
        std::fs::write(&args_path, contents)?;
        debug!("Wrote {:?}", args_path);

        let invocation = Invocation::new(
            self.tools.gn.as_str(),
            ["gen".to_string(), out_dir.to_string_lossy().into_owned()],
            self.root.clone(),
        );
        let code = self.executor.status(&invocation)?;
        if code != 0 {
            return Err(PiUtilError::ToolExited {
                tool: invocation.program,
                code,
                cwd: invocation.cwd,
            });
        }
        info!("Generated {}", out_dir.display());

        Ok(args_path)
    }

    /// Generate every target in order, aborting on the first error.
    pub fn generate_all(&self, targets: &[GnTarget], settings: &GnSettings) -> Result<Vec<PathBuf>> {
        targets
            .iter()
            .map(|target| self.generate(target, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> GnSettings {
        GnSettings {
            target_sysroot: "/w/src/build/linux/raspian_stretch_pi1-sysroot".into(),
            google_api_key: "key".into(),
            google_default_client_id: "id".into(),
            google_default_client_secret: "secret".into(),
        }
    }

    #[test]
    fn test_target_paths() {
        let target = GnTarget::new("armv6");
        assert_eq!(target.template_path(), PathBuf::from("pi-util/defargs_armv6.gn"));
        assert_eq!(target.output_dir(), PathBuf::from("out/armv6"));
        let names: Vec<_> = GnTarget::defaults().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["armv6", "armv7"]);
    }

    #[test]
    fn test_render_args_layout() {
        let text = render_args(
            "pi-util/defargs_armv7.gn",
            b"is_debug = false\narm_version = 7\n",
            "gngen",
            &settings(),
        );
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "# -- copied from: pi-util/defargs_armv7.gn\n\
             is_debug = false\n\
             arm_version = 7\n\
             # -- created by gngen\n\
             target_sysroot = \"/w/src/build/linux/raspian_stretch_pi1-sysroot\"\n\
             google_api_key = \"key\"\n\
             google_default_client_id = \"id\"\n\
             google_default_client_secret = \"secret\"\n"
        );
    }

    #[test]
    fn test_render_args_terminates_unterminated_template() {
        let text = render_args("t.gn", b"is_debug = false", "gngen", &GnSettings::default());
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("is_debug = false\n# -- created by gngen\n"));
        assert!(text.ends_with("google_default_client_secret = \"\"\n"));
    }

    #[test]
    fn test_render_args_copies_template_bytes() {
        let text = render_args("t.gn", b"# caf\xe9\nis_debug = false\n", "gngen", &settings());
        assert!(text.starts_with(b"# -- copied from: t.gn\n# caf\xe9\nis_debug = false\n"));
    }

    #[test]
    fn test_settings_default_to_empty() {
        let vars = json!({ "google_api_key": "k", "google_default_client_id": null });
        let settings = GnSettings::from_variables(vars.as_object().unwrap(), "/sysroot");
        assert_eq!(settings.target_sysroot, "/sysroot");
        assert_eq!(settings.google_api_key, "k");
        assert_eq!(settings.google_default_client_id, "");
        assert_eq!(settings.google_default_client_secret, "");
    }

    #[test]
    fn test_load_missing_gypi_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let vars = load_gyp_variables(&dir.path().join("include.gypi")).unwrap();
        assert!(vars.is_none());
    }

    #[test]
    fn test_load_gypi_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("include.gypi");
        std::fs::write(&path, "{'variables': {'google_api_key': 'abc'}}\n").unwrap();
        let vars = load_gyp_variables(&path).unwrap().unwrap();
        assert_eq!(vars["google_api_key"], json!("abc"));
    }

    #[test]
    fn test_load_gypi_without_variables_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("include.gypi");
        std::fs::write(&path, "{'targets': []}").unwrap();
        let err = load_gyp_variables(&path).unwrap_err();
        assert!(matches!(err, PiUtilError::MissingVariables { .. }));
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("armv6");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_ensure_output_dir_rejects_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::write(&out, "not a directory").unwrap();
        assert!(ensure_output_dir(&out).is_err());
    }
}
