//! Runtime binding to the packaging toolchain archive.
//!
//! The toolchain is not linked: its classes are looked up by name inside the
//! SDK's archive, and its entry points are reached by launching a JVM. This
//! module knows nothing about what the tool does.
//!
//! # Symbols
//!
//! - `pkg.Class` - a class
//! - `pkg.Class#member` - first field or method named `member`
//! - `pkg.Class#method(descriptor)` - a method with an exact JVM descriptor
//!
//! A missing class or member yields [`BindingError::SymbolMissing`], which
//! capability detection treats as data.

pub(crate) mod classfile;
mod launcher;

pub use classfile::{ClassFileError, ClassInfo, MemberInfo};
pub use launcher::{JavaLauncher, LaunchOutput, LaunchRequest, Launcher};

use crate::bundler::{BindingError, SessionContext};
use path_absolutize::Absolutize;
use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::OsString,
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
};
use zip::{ZipArchive, result::ZipError};

/// Install layout searched for the toolchain archive.
pub const TOOLCHAIN_LAYOUT: &str =
    "<JAVA_HOME>/lib/ant-javafx.jar (or <JAVA_HOME>/../lib/ant-javafx.jar when JAVA_HOME is the bundled JRE)";

/// JVM descriptor of a process entry point.
pub const ENTRY_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Qualified name of a class or class member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    class: String,
    member: Option<String>,
    descriptor: Option<String>,
}

impl Symbol {
    /// Parses `pkg.Class`, `pkg.Class#member` or `pkg.Class#member(desc)`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('#') {
            None => Self {
                class: qualified.to_string(),
                member: None,
                descriptor: None,
            },
            Some((class, member)) => {
                let (member, descriptor) = match member.find('(') {
                    Some(at) => (&member[..at], Some(member[at..].to_string())),
                    None => (member, None),
                };
                Self {
                    class: class.to_string(),
                    member: Some(member.to_string()),
                    descriptor,
                }
            }
        }
    }

    /// The owning class name.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Member name, if this names a member.
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    fn class_only(&self) -> Self {
        Self {
            class: self.class.clone(),
            member: None,
            descriptor: None,
        }
    }

    fn with_member(&self, member: &str) -> Self {
        Self {
            class: self.class.clone(),
            member: Some(member.to_string()),
            descriptor: None,
        }
    }

    /// Archive entry holding the class.
    fn entry_name(&self) -> String {
        format!("{}.class", self.class.replace('.', "/"))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class)?;
        if let Some(member) = &self.member {
            write!(f, "#{member}")?;
        }
        if let Some(descriptor) = &self.descriptor {
            f.write_str(descriptor)?;
        }
        Ok(())
    }
}

/// What a resolved handle refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleKind {
    /// A class.
    Class {
        /// Neither interface nor abstract
        concrete: bool,
        /// Declares at least one constructor
        has_constructor: bool,
    },
    /// A constructor (`#<init>`).
    Constructor { descriptor: String },
    /// A method.
    Method { descriptor: String, is_static: bool },
    /// A field.
    Field { descriptor: String },
}

#[derive(Debug)]
struct HandleInner {
    symbol: Symbol,
    kind: HandleKind,
}

/// Immutable reference to a resolved toolchain symbol.
///
/// Created by [`ToolBinder::resolve_symbol`] and cached by the binder for the
/// rest of the session. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ToolHandle(Arc<HandleInner>);

impl ToolHandle {
    /// The resolved symbol.
    pub fn symbol(&self) -> &Symbol {
        &self.0.symbol
    }

    /// What the symbol refers to.
    pub fn kind(&self) -> &HandleKind {
        &self.0.kind
    }
}

/// Typed argument passed to a bound entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArg {
    Str(String),
    Path(PathBuf),
    Bool(bool),
    Int(i64),
}

impl ToolArg {
    /// Shorthand for a string argument.
    pub fn str(value: impl Into<String>) -> Self {
        ToolArg::Str(value.into())
    }

    /// Shorthand for a path argument.
    pub fn path(value: impl Into<PathBuf>) -> Self {
        ToolArg::Path(value.into())
    }

    fn render(&self) -> OsString {
        match self {
            ToolArg::Str(s) => OsString::from(s),
            ToolArg::Path(p) => p.as_os_str().to_os_string(),
            ToolArg::Bool(b) => OsString::from(b.to_string()),
            ToolArg::Int(i) => OsString::from(i.to_string()),
        }
    }
}

/// Method name plus ordered arguments for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationSpec {
    pub method: String,
    pub args: Vec<ToolArg>,
}

impl InvocationSpec {
    /// Starts a call of `method` with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: ToolArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Appends several arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = ToolArg>) -> Self {
        self.args.extend(args);
        self
    }
}

/// A constructed launch context: a concrete class plus leading arguments.
#[derive(Debug, Clone)]
pub struct ToolInstance {
    class: ToolHandle,
    args: Vec<ToolArg>,
}

impl ToolInstance {
    /// Handle of the instantiated class.
    pub fn class(&self) -> &ToolHandle {
        &self.class
    }
}

/// Binds the toolchain archive and reaches its entry points.
pub struct ToolBinder {
    location: PathBuf,
    archive: RefCell<ZipArchive<BufReader<File>>>,
    classes: RefCell<HashMap<String, Option<Arc<ClassInfo>>>>,
    handles: RefCell<HashMap<Symbol, ToolHandle>>,
    launcher: Box<dyn Launcher>,
    context: SessionContext,
}

impl fmt::Debug for ToolBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBinder")
            .field("location", &self.location)
            .field("resolved", &self.handles.borrow().len())
            .field("launcher", &"<dyn Launcher>")
            .finish()
    }
}

impl ToolBinder {
    /// Opens the toolchain archive at `location`.
    ///
    /// # Errors
    ///
    /// [`BindingError::ToolchainNotFound`] if the path is absent, is a
    /// directory, or is not a readable archive.
    pub fn bind(
        location: &Path,
        launcher: Box<dyn Launcher>,
        context: SessionContext,
    ) -> Result<Self, BindingError> {
        let not_found = |reason: String| BindingError::ToolchainNotFound {
            location: location.to_path_buf(),
            expected_layout: TOOLCHAIN_LAYOUT.to_string(),
            reason,
        };

        if !location.exists() {
            return Err(not_found("path does not exist".into()));
        }
        if location.is_dir() {
            return Err(not_found("path is a directory, expected an archive".into()));
        }

        let file = File::open(location).map_err(|e| not_found(format!("cannot open: {e}")))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| not_found(format!("not a valid archive: {e}")))?;

        let location = location
            .absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| location.to_path_buf());

        log::info!(
            target: context.target(),
            "Bound packaging toolchain {} ({} entries)",
            location.display(),
            archive.len()
        );

        Ok(Self {
            location,
            archive: RefCell::new(archive),
            classes: RefCell::new(HashMap::new()),
            handles: RefCell::new(HashMap::new()),
            launcher,
            context,
        })
    }

    /// Location of the bound archive.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Session context this binder logs through.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Resolves a qualified symbol.
    ///
    /// # Errors
    ///
    /// [`BindingError::SymbolMissing`] when the class or member is absent.
    pub fn resolve_symbol(&self, qualified: &str) -> Result<ToolHandle, BindingError> {
        self.resolve(&Symbol::parse(qualified))
    }

    fn resolve(&self, symbol: &Symbol) -> Result<ToolHandle, BindingError> {
        if let Some(handle) = self.handles.borrow().get(symbol) {
            return Ok(handle.clone());
        }

        let missing = || BindingError::SymbolMissing {
            symbol: symbol.to_string(),
        };
        let class = self.class_info(symbol).ok_or_else(missing)?;
        let descriptor = symbol.descriptor.as_deref();

        let kind = match symbol.member() {
            None => HandleKind::Class {
                concrete: class.is_concrete(),
                has_constructor: class.method("<init>", None).is_some(),
            },
            Some("<init>") => {
                let ctor = class.method("<init>", descriptor).ok_or_else(missing)?;
                HandleKind::Constructor {
                    descriptor: ctor.descriptor.clone(),
                }
            }
            Some(name) => {
                if let Some(method) = class.method(name, descriptor) {
                    HandleKind::Method {
                        descriptor: method.descriptor.clone(),
                        is_static: method.is_static(),
                    }
                } else if let Some(field) = class.field(name, descriptor) {
                    HandleKind::Field {
                        descriptor: field.descriptor.clone(),
                    }
                } else {
                    return Err(missing());
                }
            }
        };

        let handle = ToolHandle(Arc::new(HandleInner {
            symbol: symbol.clone(),
            kind,
        }));
        self.handles
            .borrow_mut()
            .insert(symbol.clone(), handle.clone());
        Ok(handle)
    }

    /// Reads and caches a class; `None` when absent or unreadable.
    fn class_info(&self, symbol: &Symbol) -> Option<Arc<ClassInfo>> {
        if let Some(cached) = self.classes.borrow().get(symbol.class()) {
            return cached.clone();
        }

        let entry = symbol.entry_name();
        let info = match self.read_entry(&entry) {
            Ok(Some(bytes)) => match classfile::parse(&bytes) {
                Ok(info) => Some(Arc::new(info)),
                Err(e) => {
                    log::warn!(
                        target: self.context.target(),
                        "Class entry {entry} in {} is unreadable ({e}); treating as absent",
                        self.location.display()
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!(
                    target: self.context.target(),
                    "Failed to read {entry} from {}: {e}",
                    self.location.display()
                );
                None
            }
        };

        self.classes
            .borrow_mut()
            .insert(symbol.class().to_string(), info.clone());
        info
    }

    fn read_entry(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = match archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(std::io::Error::other(e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// Reads a main attribute from the archive manifest.
    ///
    /// Absence of the manifest or the attribute is `None`, never an error.
    pub fn manifest_attribute(&self, name: &str) -> Option<String> {
        let bytes = self.read_entry(MANIFEST_ENTRY).ok().flatten()?;
        manifest_value(&String::from_utf8_lossy(&bytes), name)
    }

    /// Creates a launch context for a concrete class.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvocationFailed`] naming the symbol when the handle is
    /// not a constructible class.
    pub fn construct(
        &self,
        handle: &ToolHandle,
        args: Vec<ToolArg>,
    ) -> Result<ToolInstance, BindingError> {
        let symbol = handle.symbol();
        let class = match handle.kind() {
            HandleKind::Class {
                concrete: false, ..
            } => {
                return Err(BindingError::invocation(
                    symbol,
                    "cannot construct an interface or abstract class",
                ));
            }
            HandleKind::Class {
                has_constructor: false,
                ..
            } => {
                return Err(BindingError::invocation(symbol, "class declares no constructor"));
            }
            HandleKind::Class { .. } => handle.clone(),
            HandleKind::Constructor { .. } => self.resolve(&symbol.class_only())?,
            HandleKind::Method { .. } | HandleKind::Field { .. } => {
                return Err(BindingError::invocation(
                    symbol,
                    "not a class or constructor",
                ));
            }
        };

        Ok(ToolInstance { class, args })
    }

    /// Invokes a bound entry point.
    ///
    /// The method's class is launched as the JVM main class with the
    /// instance's leading arguments followed by `args`. Only static
    /// `([Ljava/lang/String;)V` methods can be reached this way.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvocationFailed`] naming the symbol on a kind or
    /// descriptor mismatch, a receiver of another class, a launch failure, or
    /// a non-zero exit status.
    pub fn invoke(
        &self,
        handle: &ToolHandle,
        instance: Option<&ToolInstance>,
        args: &[ToolArg],
    ) -> Result<LaunchOutput, BindingError> {
        let symbol = handle.symbol();
        match handle.kind() {
            HandleKind::Method {
                descriptor,
                is_static,
            } => {
                if descriptor != ENTRY_DESCRIPTOR {
                    return Err(BindingError::invocation(
                        symbol,
                        format!(
                            "descriptor {descriptor} is not a process entry point (expected {ENTRY_DESCRIPTOR})"
                        ),
                    ));
                }
                if !is_static {
                    return Err(BindingError::invocation(
                        symbol,
                        "instance methods cannot be reached through a JVM launch",
                    ));
                }
            }
            _ => return Err(BindingError::invocation(symbol, "not a method")),
        }

        if let Some(instance) = instance {
            let receiver = instance.class.symbol().class();
            if receiver != symbol.class() {
                return Err(BindingError::invocation(
                    symbol,
                    format!("receiver is an instance of {receiver}"),
                ));
            }
        }

        let leading = instance.map(|i| i.args.as_slice()).unwrap_or_default();
        let request = LaunchRequest {
            classpath: self.location.clone(),
            main_class: symbol.class().to_string(),
            args: leading.iter().chain(args).map(ToolArg::render).collect(),
        };

        let output = self
            .launcher
            .launch(&request)
            .map_err(|e| BindingError::invocation(symbol, format!("failed to launch JVM: {e}")))?;

        let label = symbol.to_string();
        self.context
            .relay_tool_output(&label, &output.stdout, &output.stderr);

        if !output.success() {
            let status = output
                .status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let cause = match output.last_diagnostic() {
                Some(line) => format!("exit status {status}: {line}"),
                None => format!("exit status {status}"),
            };
            return Err(BindingError::invocation(symbol, cause));
        }

        Ok(output)
    }

    /// Resolves `spec.method` on the instance's class and invokes it.
    pub fn call(
        &self,
        instance: &ToolInstance,
        spec: InvocationSpec,
    ) -> Result<LaunchOutput, BindingError> {
        let handle = self.resolve(&instance.class.symbol().with_member(&spec.method))?;
        self.invoke(&handle, Some(instance), &spec.args)
    }
}

/// Looks up a main-section attribute, honouring continuation lines.
fn manifest_value(manifest: &str, name: &str) -> Option<String> {
    let mut current: Option<(String, String)> = None;
    for line in manifest.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str(rest);
            }
            continue;
        }
        if let Some((key, value)) = current.take() {
            if key.eq_ignore_ascii_case(name) {
                return Some(value.trim().to_string());
            }
        }
        // Blank line ends the main section
        if line.trim().is_empty() {
            return None;
        }
        current = line
            .split_once(':')
            .map(|(k, v)| (k.trim().to_string(), v.trim_start().to_string()));
    }
    current
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim().to_string())
}
