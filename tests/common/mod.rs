//! Shared fixtures: synthetic toolchain archives and a scripted packager.
#![allow(dead_code)]

use kodegen_bundler_jfx::bundler::binder::{LaunchOutput, LaunchRequest, Launcher};
use std::{
    cell::RefCell,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

pub const PACKAGER: &str = "com.sun.javafx.tools.packager.Main";
pub const JNLP_BUNDLER: &str = "com.oracle.tools.packager.jnlp.JNLPBundler";
pub const BUNDLER_PARAM: &str = "com.oracle.tools.packager.StandardBundlerParam";

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_SUPER: u16 = 0x0020;

/// Minimal class file with the given members and no attributes.
pub fn class_bytes(name: &str, fields: &[(&str, &str)], methods: &[(u16, &str, &str)]) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = Vec::new();
    let utf8 = |pool: &mut Vec<Vec<u8>>, s: &str| -> u16 {
        let mut entry = vec![1u8];
        entry.extend_from_slice(&(s.len() as u16).to_be_bytes());
        entry.extend_from_slice(s.as_bytes());
        pool.push(entry);
        pool.len() as u16
    };
    let class_ref = |pool: &mut Vec<Vec<u8>>, utf8_index: u16| -> u16 {
        let mut entry = vec![7u8];
        entry.extend_from_slice(&utf8_index.to_be_bytes());
        pool.push(entry);
        pool.len() as u16
    };

    let this_name = utf8(&mut pool, &name.replace('.', "/"));
    let this_class = class_ref(&mut pool, this_name);
    let super_name = utf8(&mut pool, "java/lang/Object");
    let super_class = class_ref(&mut pool, super_name);

    let member_table = |pool: &mut Vec<Vec<u8>>, members: &[(u16, &str, &str)]| {
        let mut out = (members.len() as u16).to_be_bytes().to_vec();
        for (access, member, descriptor) in members {
            let n = utf8(pool, member);
            let d = utf8(pool, descriptor);
            out.extend_from_slice(&access.to_be_bytes());
            out.extend_from_slice(&n.to_be_bytes());
            out.extend_from_slice(&d.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }
        out
    };
    let field_members: Vec<(u16, &str, &str)> = fields
        .iter()
        .map(|(n, d)| (ACC_PUBLIC | ACC_STATIC | ACC_FINAL, *n, *d))
        .collect();
    let fields_table = member_table(&mut pool, &field_members);
    let methods_table = member_table(&mut pool, methods);

    let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52];
    out.extend_from_slice(&((pool.len() + 1) as u16).to_be_bytes());
    for entry in &pool {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(&(ACC_PUBLIC | ACC_SUPER).to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&fields_table);
    out.extend_from_slice(&methods_table);
    out.extend_from_slice(&0u16.to_be_bytes());
    out
}

/// Which generation of packager to fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Entry point only
    Classic,
    /// Web bundler plus config format and secondary launcher parameters
    Modern,
}

/// Writes `<dir>/jdk/lib/ant-javafx.jar`.
pub fn write_toolchain(dir: &Path, version: &str, generation: Generation) -> PathBuf {
    let lib = dir.join("jdk").join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    let path = lib.join("ant-javafx.jar");

    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
    write!(zip, "Manifest-Version: 1.0\r\nImplementation-Version: {version}\r\n\r\n").unwrap();

    let mut classes = vec![(
        PACKAGER,
        class_bytes(
            PACKAGER,
            &[],
            &[
                (ACC_PUBLIC, "<init>", "()V"),
                (ACC_PUBLIC | ACC_STATIC, "main", "([Ljava/lang/String;)V"),
            ],
        ),
    )];
    if generation == Generation::Modern {
        classes.push((JNLP_BUNDLER, class_bytes(JNLP_BUNDLER, &[], &[])));
        let param = "Lcom/oracle/tools/packager/BundlerParamInfo;";
        classes.push((
            BUNDLER_PARAM,
            class_bytes(
                BUNDLER_PARAM,
                &[("LAUNCHER_CFG_FORMAT", param), ("SECONDARY_LAUNCHERS", param)],
                &[],
            ),
        ));
    }
    for (name, bytes) in classes {
        zip.start_file(format!("{}.class", name.replace('.', "/")), options)
            .unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Value following `flag`.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Every value following `flag`.
pub fn flag_values(args: &[String], flag: &str) -> Vec<String> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].clone())
        .collect()
}

/// Bytes the fake signer appends to each jar.
pub const SIGNATURE_BYTES: usize = 64;

/// Imitates the packager on disk, including its known output defects:
/// stale jar sizes in descriptors, a config named after the full app name,
/// and descriptors written even for native-only requests.
#[derive(Clone, Default)]
pub struct FakePackager {
    calls: Rc<RefCell<Vec<Vec<String>>>>,
    /// Command (`-createjar`, `-signJar`, `-deploy`) that exits with status 1
    pub fail_on: Option<&'static str>,
}

impl FakePackager {
    pub fn failing_on(command: &'static str) -> Self {
        Self {
            fail_on: Some(command),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().filter_map(|c| c.into_iter().next()).collect()
    }

    fn simulate(&self, args: &[String]) -> io::Result<()> {
        match args.first().map(String::as_str) {
            Some("-createjar") => {
                let out = PathBuf::from(flag_value(args, "-outdir").unwrap());
                std::fs::create_dir_all(&out)?;
                std::fs::write(out.join(flag_value(args, "-outfile").unwrap()), vec![b'J'; 100])
            }
            Some("-signJar") => {
                let jar = PathBuf::from(flag_value(args, "-srcdir").unwrap())
                    .join(flag_value(args, "-srcfiles").unwrap());
                let mut bytes = std::fs::read(&jar)?;
                bytes.extend(std::iter::repeat_n(b'S', SIGNATURE_BYTES));
                std::fs::write(jar, bytes)
            }
            Some("-deploy") => {
                let out = PathBuf::from(flag_value(args, "-outdir").unwrap());
                let src = PathBuf::from(flag_value(args, "-srcdir").unwrap());
                let name = flag_value(args, "-name").unwrap();
                let native = flag_value(args, "-native").unwrap();

                let mut jnlp = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<jnlp>\r\n  <resources>\r\n");
                for jar in flag_values(args, "-srcfiles") {
                    let target = out.join(&jar);
                    std::fs::create_dir_all(target.parent().unwrap())?;
                    std::fs::copy(src.join(&jar), &target)?;
                    jnlp.push_str(&format!("    <jar href=\"{jar}\" size=\"1\" download=\"eager\" />\r\n"));
                }
                jnlp.push_str("  </resources>\r\n</jnlp>\r\n");
                std::fs::write(out.join(format!("{name}.jnlp")), jnlp)?;
                std::fs::write(out.join(format!("{name}.html")), "<html></html>")?;

                if native != "jnlp" {
                    let app = out.join("bundles").join(&name).join("app");
                    std::fs::create_dir_all(&app)?;
                    std::fs::write(app.join(format!("{name}.cfg")), "[Application]\n")?;
                    for launcher in args
                        .iter()
                        .filter_map(|a| a.strip_prefix("-BsecondaryLaunchers="))
                        .flat_map(|names| names.split(','))
                    {
                        std::fs::write(app.join(format!("{launcher}.cfg")), "[Application]\n")?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Launcher for FakePackager {
    fn launch(&self, request: &LaunchRequest) -> io::Result<LaunchOutput> {
        let args = request.args_lossy();
        self.calls.borrow_mut().push(args.clone());

        if let Some(command) = self
            .fail_on
            .filter(|command| args.first().map(String::as_str) == Some(*command))
        {
            return Ok(LaunchOutput {
                status_code: Some(1),
                stdout: String::new(),
                stderr: format!("Error: {command} failed\n"),
            });
        }

        self.simulate(&args)?;
        Ok(LaunchOutput {
            status_code: Some(0),
            stdout: "done\n".into(),
            stderr: String::new(),
        })
    }
}
