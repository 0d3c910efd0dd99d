//! Fixtures shared by unit tests: synthetic toolchain archives and a
//! recording launcher.

use crate::bundler::binder::{LaunchOutput, LaunchRequest, Launcher, classfile::synth};
use std::{
    cell::RefCell,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

pub const ENTRY: &str = "([Ljava/lang/String;)V";

/// A class written into a synthetic archive.
pub struct ClassSpec {
    pub name: String,
    pub access: u16,
    pub fields: Vec<(u16, String, String)>,
    pub methods: Vec<(u16, String, String)>,
}

impl ClassSpec {
    /// Concrete class with a public constructor and a static `main`.
    pub fn entry_point(name: &str) -> Self {
        Self {
            name: name.into(),
            access: 0x0021,
            fields: Vec::new(),
            methods: vec![
                (0x0001, "<init>".into(), "()V".into()),
                (0x0009, "main".into(), ENTRY.into()),
            ],
        }
    }

    /// Concrete class with no members.
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.into(),
            access: 0x0021,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Adds a static field.
    pub fn with_field(mut self, name: &str) -> Self {
        self.fields
            .push((0x0019, name.into(), "Lcom/oracle/tools/packager/BundlerParamInfo;".into()));
        self
    }

    fn bytes(&self) -> Vec<u8> {
        let fields: Vec<_> = self
            .fields
            .iter()
            .map(|(a, n, d)| (*a, n.as_str(), d.as_str()))
            .collect();
        let methods: Vec<_> = self
            .methods
            .iter()
            .map(|(a, n, d)| (*a, n.as_str(), d.as_str()))
            .collect();
        synth::class_bytes(self.access, &self.name, &fields, &methods)
    }
}

/// Writes `ant-javafx.jar` under `dir` with the given classes and manifest
/// `Implementation-Version` (omitted when empty).
pub fn write_toolchain(dir: &Path, version: &str, classes: &[ClassSpec]) -> PathBuf {
    let path = dir.join("ant-javafx.jar");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
    let mut manifest = String::from("Manifest-Version: 1.0\r\n");
    if !version.is_empty() {
        manifest.push_str(&format!("Implementation-Version: {version}\r\n"));
    }
    manifest.push_str("\r\n");
    zip.write_all(manifest.as_bytes()).unwrap();

    for class in classes {
        zip.start_file(format!("{}.class", class.name.replace('.', "/")), options)
            .unwrap();
        zip.write_all(&class.bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

type Effect = dyn Fn(&LaunchRequest) -> io::Result<LaunchOutput>;

/// Records launches and answers with a configurable effect.
#[derive(Clone)]
pub struct RecordingLauncher {
    calls: Rc<RefCell<Vec<LaunchRequest>>>,
    effect: Rc<Effect>,
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self::with_effect(|_| {
            Ok(LaunchOutput {
                status_code: Some(0),
                ..Default::default()
            })
        })
    }
}

impl RecordingLauncher {
    pub fn with_effect(effect: impl Fn(&LaunchRequest) -> io::Result<LaunchOutput> + 'static) -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            effect: Rc::new(effect),
        }
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        let stderr = stderr.to_string();
        Self::with_effect(move |_| {
            Ok(LaunchOutput {
                status_code: Some(code),
                stdout: String::new(),
                stderr: stderr.clone(),
            })
        })
    }

    pub fn calls(&self) -> Vec<LaunchRequest> {
        self.calls.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, request: &LaunchRequest) -> io::Result<LaunchOutput> {
        self.calls.borrow_mut().push(request.clone());
        (self.effect)(request)
    }
}

/// Value following `flag` in recorded arguments.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
