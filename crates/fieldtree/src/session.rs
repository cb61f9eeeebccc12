// crates/fieldtree/src/session.rs
//! Operator-facing session: load, import, scan, save, and toggle devices.
//!
//! A [`Session`] owns one configuration engine on a dedicated owner thread.
//! Every public method marshals its work onto that thread and blocks until
//! it is done, so the engine and the checklist are only ever touched by one
//! thread, in request order.

use crate::checklist::{Checklist, EntryId, EntryView};
use crate::config::SessionConfig;
use crate::engine::{ConfigEngine, TreeNode};
use crate::error::{EngineError, SessionError};
use crate::log::{LogContext, my_debug, my_error, my_info};
use crate::mutation::{self, ToggleOutcome};
use crate::owner::Owner;
use crate::types::RootKey;
use crate::walker::walk_root;
use std::path::{Path, PathBuf};

/// Human-readable progress lines of one operation.
///
/// Every line is also forwarded to the `log` facade.
#[derive(Debug)]
pub struct Transcript {
    ctx: LogContext,
    lines: Vec<String>,
}

impl Transcript {
    pub fn new(ctx: LogContext) -> Self {
        Self {
            ctx,
            lines: Vec::new(),
        }
    }

    pub fn line(&mut self, line: impl Into<String>) {
        let line = line.into();
        my_info!(self.ctx, "{}", line);
        self.lines.push(line);
    }

    pub fn error(&mut self, line: impl Into<String>) {
        let line = line.into();
        my_error!(self.ctx, "{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Outcome of a session operation: its progress lines and final result.
#[derive(Debug)]
pub struct Report<T> {
    pub lines: Vec<String>,
    pub result: Result<T, SessionError>,
}

impl<T> Report<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, SessionError> {
        self.result
    }

    fn failed(err: SessionError) -> Self {
        Self {
            lines: vec![err.to_string()],
            result: Err(err),
        }
    }
}

/// State that lives on the owner thread.
struct Core<E: ConfigEngine> {
    engine: E,
    config: SessionConfig,
    checklist: Checklist<E::Node>,
    loaded: bool,
    /// Root walked by the last successful load, import or scan.
    current_root: Option<RootKey>,
}

impl<E: ConfigEngine> Core<E> {
    fn require_loaded(&self) -> Result<(), SessionError> {
        if self.loaded {
            Ok(())
        } else {
            Err(SessionError::NotLoaded)
        }
    }

    fn load(&mut self, path: &Path, t: &mut Transcript) -> Result<Vec<EntryView>, SessionError> {
        t.line(format!("Loading project: {}", path.display()));
        self.engine
            .open_project(path)
            .map_err(|e| SessionError::ProjectLoadFailed {
                path: path.display().to_string(),
                reason: e.message,
            })?;
        self.loaded = true;
        t.line("Configuration loaded successfully.");
        t.line("You can now load XTI files or scan for devices.");

        self.system_info(t);
        self.refresh(RootKey::DeviceRoot, t)
    }

    fn import(&mut self, path: &Path, t: &mut Transcript) -> Result<Vec<EntryView>, SessionError> {
        self.require_loaded()?;
        t.line(format!("Loading XTI file: {}", path.display()));
        self.engine
            .import_fragment_set(path)
            .map_err(|e| SessionError::ImportFailed {
                path: path.display().to_string(),
                reason: e.message,
            })?;
        t.line("XTI file loaded successfully.");

        self.system_info(t);
        self.refresh(RootKey::ImportedDeviceRoot, t)
    }

    fn scan(&mut self, t: &mut Transcript) -> Result<Vec<EntryView>, SessionError> {
        self.require_loaded()?;
        t.line("Starting network scan for EtherCAT devices...");

        let key = self.config.key(RootKey::DeviceRoot).to_owned();
        let devices = match self.engine.lookup(&key) {
            Ok(Some(devices)) => devices,
            Ok(None) | Err(_) => {
                t.line("Could not find I/O Devices node.");
                return Err(SessionError::RootNotFound { key });
            }
        };

        t.line("Scanning for devices...");
        let scan_failed = |e: EngineError| SessionError::ScanFailed(e.message);
        let device = devices
            .create_child(&self.config.scan_device_kind, 0, "", None)
            .map_err(scan_failed)?;
        device
            .consume_fragment(&self.config.scan_fragment)
            .map_err(scan_failed)?;
        t.line("Scan completed. Enumerating found devices...");

        self.refresh(RootKey::DeviceRoot, t)
    }

    fn save(&mut self, path: Option<&Path>, t: &mut Transcript) -> Result<(), SessionError> {
        self.require_loaded()?;
        self.engine
            .save_project(path)
            .map_err(|e| SessionError::SaveFailed(e.message))?;
        match path {
            Some(path) => t.line(format!("Configuration Saved to {}", path.display())),
            None => t.line("Configuration Saved"),
        }
        Ok(())
    }

    fn clear(&mut self, t: &mut Transcript) {
        self.checklist.clear();
        t.line("Device list cleared.");
    }

    fn rebuild(&mut self, t: &mut Transcript) -> Result<Vec<EntryView>, SessionError> {
        self.require_loaded()?;
        let root = self.current_root.unwrap_or(RootKey::DeviceRoot);
        self.refresh(root, t)
    }

    /// Walks `root` and rebuilds the checklist. A missing root leaves the
    /// current checklist untouched.
    fn refresh(
        &mut self,
        root: RootKey,
        t: &mut Transcript,
    ) -> Result<Vec<EntryView>, SessionError> {
        let key = self.config.key(root).to_owned();
        let walker = match walk_root(&self.engine, &key) {
            Ok(walker) => walker,
            Err(e) => {
                t.line("Could not find I/O Devices node.");
                return Err(e);
            }
        };
        self.current_root = Some(root);
        self.checklist.rebuild(walker, t);
        Ok(self.checklist.views())
    }

    /// Reports the system name. Failures are logged, never fatal.
    fn system_info(&self, t: &mut Transcript) {
        t.line("=== System Information ===");
        match self.engine.lookup(self.config.key(RootKey::SystemInfoRoot)) {
            Ok(Some(system)) => {
                match system.name() {
                    Ok(name) => t.line(format!("System Name: {name}")),
                    Err(e) => t.line(format!("Error getting system info: {e}")),
                }
                if let Ok(xml) = system.produce_fragment(false) {
                    my_debug!(t.ctx, "System fragment has {} bytes", xml.len());
                }
            }
            Ok(None) => t.line("System information not available."),
            Err(e) => t.line(format!("Error getting system info: {e}")),
        }
        t.line("=========================");
    }

    fn toggle(
        &mut self,
        id: EntryId,
        desired_enabled: bool,
    ) -> Result<ToggleOutcome, SessionError> {
        let entry = self
            .checklist
            .get_mut(id)
            .ok_or(SessionError::UnknownEntry(id))?;
        mutation::toggle(entry, desired_enabled)
    }
}

impl<E: ConfigEngine> Drop for Core<E> {
    fn drop(&mut self) {
        let ctx = LogContext::new("session", "release");
        // Node handles go before the engine that owns them.
        self.checklist.clear();
        match self.engine.release() {
            Ok(()) => my_info!(ctx, "Configuration engine released"),
            Err(e) => my_error!(ctx, "Error during cleanup: {}", e),
        }
    }
}

/// Handle to a configuration session. Cheap to share between threads by
/// reference; all methods block until the owner thread has answered.
pub struct Session<E: ConfigEngine> {
    owner: Option<Owner<Core<E>>>,
    config: SessionConfig,
}

impl<E> Session<E>
where
    E: ConfigEngine + 'static,
    E::Node: 'static,
{
    /// Starts the owner thread and creates the engine on it.
    ///
    /// A failing `factory` yields [`SessionError::EngineUnavailable`].
    pub fn start<F>(config: SessionConfig, factory: F) -> Result<Self, SessionError>
    where
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let owner = Self::spawn_owner(&config, factory)?;
        Ok(Self {
            owner: Some(owner),
            config,
        })
    }

    fn spawn_owner<F>(config: &SessionConfig, factory: F) -> Result<Owner<Core<E>>, SessionError>
    where
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let ctx = LogContext::new("session", "init");
        let core_config = config.clone();
        let spawned = Owner::spawn(&config.owner_thread_name, move || {
            factory().map(|engine| Core {
                engine,
                config: core_config,
                checklist: Checklist::new(),
                loaded: false,
                current_root: None,
            })
        })?;
        match spawned {
            Ok(owner) => {
                my_info!(ctx, "Configuration engine initialized successfully.");
                Ok(owner)
            }
            Err(e) => {
                my_error!(ctx, "Error initializing configuration engine: {}", e);
                Err(SessionError::EngineUnavailable(e.message))
            }
        }
    }

    /// Releases the current engine (after every queued operation has
    /// finished) and starts a fresh one. The new session is not loaded.
    pub fn reinit<F>(&mut self, factory: F) -> Result<(), SessionError>
    where
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        if let Some(owner) = self.owner.take() {
            owner.shutdown();
        }
        self.owner = Some(Self::spawn_owner(&self.config, factory)?);
        Ok(())
    }

    /// Releases the engine once every queued operation has finished.
    pub fn shutdown(mut self) {
        if let Some(owner) = self.owner.take() {
            owner.shutdown();
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn run<R, F>(&self, job: F) -> Result<R, SessionError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Core<E>) -> Result<R, SessionError> + Send + 'static,
    {
        let owner = self.owner.as_ref().ok_or_else(|| {
            SessionError::EngineUnavailable("session is not initialized".into())
        })?;
        owner.run(job)?
    }

    fn report<T, F>(&self, op: &'static str, job: F) -> Report<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Core<E>, &mut Transcript) -> Result<T, SessionError> + Send + 'static,
    {
        let outcome = self.run(move |core| {
            let mut transcript = Transcript::new(LogContext::new("session", op));
            let result = job(core, &mut transcript);
            if let Err(e) = &result {
                transcript.error(e.to_string());
            }
            Ok(Report {
                lines: transcript.into_lines(),
                result,
            })
        });
        outcome.unwrap_or_else(Report::failed)
    }

    // --- Presentation API ---

    /// Opens a project and lists the devices below the device root.
    pub fn on_load(&self, path: impl Into<PathBuf>) -> Report<Vec<EntryView>> {
        let path = path.into();
        self.report("load", move |core, t| core.load(&path, t))
    }

    /// Imports an XTI file and lists the devices below the imported root.
    pub fn on_import(&self, path: impl Into<PathBuf>) -> Report<Vec<EntryView>> {
        let path = path.into();
        self.report("import", move |core, t| core.import(&path, t))
    }

    /// Scans the network for boxes and lists the device root again.
    pub fn on_scan(&self) -> Report<Vec<EntryView>> {
        self.report("scan", |core, t| core.scan(t))
    }

    /// Saves the project in place (`None`) or to `path`.
    pub fn on_save(&self, path: Option<PathBuf>) -> Report<()> {
        self.report("save", move |core, t| core.save(path.as_deref(), t))
    }

    /// Empties the presented list.
    pub fn on_clear(&self) -> Report<()> {
        self.report("clear", |core, t| {
            core.clear(t);
            Ok(())
        })
    }

    /// Walks the last used root again and replaces the presented list.
    pub fn rebuild_checklist(&self) -> Report<Vec<EntryView>> {
        self.report("rebuild", |core, t| core.rebuild(t))
    }

    /// Sets the enabled state of one entry.
    ///
    /// On rejection the entry is reverted and the engine's message is
    /// returned in [`SessionError::MutationRejected`].
    pub fn on_toggle(
        &self,
        id: EntryId,
        desired_enabled: bool,
    ) -> Result<ToggleOutcome, SessionError> {
        self.run(move |core| core.toggle(id, desired_enabled))
    }

    /// Current checklist snapshot.
    pub fn entries(&self) -> Result<Vec<EntryView>, SessionError> {
        self.run(|core| Ok(core.checklist.views()))
    }

    pub fn is_loaded(&self) -> Result<bool, SessionError> {
        self.run(|core| Ok(core.loaded))
    }
}
