// crates/fieldtree-console/src/lib.rs
//! Command parsing and execution for the `fieldtree` console.
//!
//! Each input line is one [`Command`]. The [`Shell`] runs it against a
//! [`Session`] and writes the operation transcript, followed by the
//! resulting device list, to the given writer. Devices are addressed by
//! their 1-based position in the last printed list.

use fieldtree::{ConfigEngine, EntryView, Report, Session};
use log::debug;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  load <project>     open a project file and list its I/O devices
  import <xti>       import an XTI file below the imported devices root
  scan               scan the network for boxes and list the I/O devices
  list               print the device list
  json               print the device list as JSON
  enable <n>         enable device n
  disable <n>        disable device n
  refresh            walk the tree again
  clear              empty the device list
  save [path]        save the project in place, or to path
  help               show this text
  quit               leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Import(PathBuf),
    Scan,
    List,
    Json,
    Enable(usize),
    Disable(usize),
    Refresh,
    Clear,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadIndex(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty command"),
            Self::Unknown(cmd) => write!(f, "Unknown command '{}'; type 'help'", cmd),
            Self::MissingArgument(arg) => write!(f, "Missing argument <{}>", arg),
            Self::BadIndex(s) => write!(f, "'{}' is not a device number", s),
        }
    }
}

impl std::error::Error for ParseError {}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let path = |name: &'static str| {
            if rest.is_empty() {
                Err(ParseError::MissingArgument(name))
            } else {
                Ok(PathBuf::from(rest))
            }
        };
        let index = || {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("n"));
            }
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ParseError::BadIndex(rest.to_owned())),
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "load" | "open" => path("project").map(Command::Load),
            "import" => path("xti").map(Command::Import),
            "scan" => Ok(Command::Scan),
            "list" | "ls" => Ok(Command::List),
            "json" => Ok(Command::Json),
            "enable" | "on" => index().map(Command::Enable),
            "disable" | "off" => index().map(Command::Disable),
            "refresh" => Ok(Command::Refresh),
            "clear" => Ok(Command::Clear),
            "save" => Ok(Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_owned())),
        }
    }
}

/// Whether the console keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<E: ConfigEngine> {
    session: Session<E>,
    /// The list as last printed; `enable`/`disable` index into it.
    views: Vec<EntryView>,
}

impl<E> Shell<E>
where
    E: ConfigEngine + 'static,
    E::Node: 'static,
{
    pub fn new(session: Session<E>) -> Self {
        Self {
            session,
            views: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    pub fn views(&self) -> &[EntryView] {
        &self.views
    }

    pub fn into_session(self) -> Session<E> {
        self.session
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        debug!("Executing {:?}", command);
        match command {
            Command::Load(path) => {
                let report = self.session.on_load(path);
                self.show_list_report(report, out)?;
            }
            Command::Import(path) => {
                let report = self.session.on_import(path);
                self.show_list_report(report, out)?;
            }
            Command::Scan => {
                let report = self.session.on_scan();
                self.show_list_report(report, out)?;
            }
            Command::Refresh => {
                let report = self.session.rebuild_checklist();
                self.show_list_report(report, out)?;
            }
            Command::List => {
                self.sync_views(out)?;
                self.print_list(out)?;
            }
            Command::Json => {
                self.sync_views(out)?;
                serde_json::to_writer_pretty(&mut *out, &self.views)?;
                writeln!(out)?;
            }
            Command::Enable(n) => self.toggle(n, true, out)?,
            Command::Disable(n) => self.toggle(n, false, out)?,
            Command::Clear => {
                let report = self.session.on_clear();
                print_lines(&report.lines, out)?;
                if report.is_ok() {
                    self.views.clear();
                }
            }
            Command::Save(path) => {
                let report = self.session.on_save(path);
                print_lines(&report.lines, out)?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Reads commands from `input` until `quit` or end of input. Parse errors
    /// are printed and skipped; a failed read or write ends the loop.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(ParseError::Empty) => continue,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };
            if self.execute(command, &mut *out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    fn show_list_report(
        &mut self,
        report: Report<Vec<EntryView>>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        print_lines(&report.lines, out)?;
        if let Ok(views) = report.result {
            self.views = views;
            self.print_list(out)?;
        }
        Ok(())
    }

    fn sync_views(&mut self, out: &mut impl Write) -> io::Result<()> {
        match self.session.entries() {
            Ok(views) => self.views = views,
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }

    fn print_list(&self, out: &mut impl Write) -> io::Result<()> {
        if self.views.is_empty() {
            return writeln!(out, "(no devices)");
        }
        for (i, view) in self.views.iter().enumerate() {
            let mark = if view.checked { 'x' } else { ' ' };
            let indent = "  ".repeat(usize::from(view.depth));
            writeln!(out, "{:>3}. [{}] {}{}", i + 1, mark, indent, view.label)?;
        }
        Ok(())
    }

    fn toggle(&mut self, n: usize, enabled: bool, out: &mut impl Write) -> io::Result<()> {
        let Some(view) = n.checked_sub(1).and_then(|i| self.views.get(i)) else {
            return writeln!(out, "No device {n}; the list has {} entries", self.views.len());
        };
        match self.session.on_toggle(view.id, enabled) {
            Ok(outcome) => {
                if !outcome.marker_found {
                    writeln!(out, "'{}' has no Disabled setting; nothing changed", outcome.label)?;
                }
                writeln!(
                    out,
                    "{} {}",
                    outcome.label,
                    if outcome.enabled { "enabled" } else { "disabled" }
                )?;
                self.views[n - 1].checked = outcome.enabled;
            }
            Err(e) => {
                writeln!(out, "{e}")?;
                self.sync_views(out)?;
            }
        }
        Ok(())
    }
}

fn print_lines(lines: &[String], out: &mut impl Write) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtree::SessionConfig;
    use fieldtree_xti::XtiEngine;
    use std::fs;

    const PROJECT: &str = r#"<Project Name="Test">
  <Root Key="TIID" Name="I/O Devices">
    <TreeItem Name="Device 1 (EtherCAT)" Type="2">
      <TreeItem Name="Term 1 (EL1008)" Type="6"><Disabled>true</Disabled></TreeItem>
    </TreeItem>
  </Root>
  <Root Key="TIIC" Name="Imported Devices"/>
</Project>"#;

    fn run(shell: &mut Shell<XtiEngine>, line: &str) -> String {
        let mut out = Vec::new();
        let command: Command = line.parse().unwrap();
        shell.execute(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("load  my plant.xml ".parse::<Command>(), Ok(Command::Load("my plant.xml".into())));
        assert_eq!("DISABLE 3".parse::<Command>(), Ok(Command::Disable(3)));
        assert_eq!("save".parse::<Command>(), Ok(Command::Save(None)));
        assert_eq!("save copy.xml".parse::<Command>(), Ok(Command::Save(Some("copy.xml".into()))));
        assert_eq!("enable".parse::<Command>(), Err(ParseError::MissingArgument("n")));
        assert_eq!("enable 0".parse::<Command>(), Err(ParseError::BadIndex("0".into())));
        assert_eq!("import".parse::<Command>(), Err(ParseError::MissingArgument("xti")));
        assert_eq!("fly".parse::<Command>(), Err(ParseError::Unknown("fly".into())));
        assert_eq!("   ".parse::<Command>(), Err(ParseError::Empty));
    }

    #[test]
    fn test_load_toggle_and_json() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = std::env::temp_dir().join(format!("fieldtree-console-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.xml");
        fs::write(&path, PROJECT).unwrap();

        let session = Session::start(SessionConfig::default(), || Ok(XtiEngine::new())).unwrap();
        let mut shell = Shell::new(session);

        let out = run(&mut shell, &format!("load {}", path.display()));
        assert!(out.contains("  1. [x] Device 1 (EtherCAT) (2)"));
        assert!(out.contains("  2. [ ]   Term 1 (EL1008) (6)"));
        // No system root in this project.
        assert!(out.contains("Error getting system info: Invalid tree item path 'TIRS'"));

        let out = run(&mut shell, "enable 2");
        assert_eq!(out, "Term 1 (EL1008) (6) enabled\n");
        assert!(shell.views()[1].checked);

        let out = run(&mut shell, "enable 9");
        assert_eq!(out, "No device 9; the list has 2 entries\n");

        let out = run(&mut shell, "json");
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json[1]["name"], "Term 1 (EL1008)");
        assert_eq!(json[1]["checked"], true);
        assert_eq!(json[1]["type_code"], 6);

        run(&mut shell, "clear");
        assert_eq!(run(&mut shell, "list"), "(no devices)\n");
        assert_eq!(shell.execute(Command::Quit, &mut io::sink()).unwrap(), Flow::Quit);

        shell.into_session().shutdown();
        fs::remove_dir_all(&dir).ok();
    }

    /// Accepts the first `limit` bytes, then fails every write.
    struct FailingWriter {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_loop() {
        let session = Session::start(SessionConfig::default(), || Ok(XtiEngine::new())).unwrap();
        let mut shell = Shell::new(session);

        let mut out = Vec::new();
        shell.run("\nfly\nhelp\nquit\nlist\n".as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("> > Unknown command 'fly'; type 'help'\n> Commands:"));
        // Nothing after `quit` runs.
        assert!(!out.contains("(no devices)"));

        // A parse error that cannot be printed ends the loop.
        let mut out = FailingWriter {
            written: Vec::new(),
            limit: 2,
        };
        let err = shell.run("fly\nhelp\n".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(out.written, b"> ");

        shell.into_session().shutdown();
    }
}
