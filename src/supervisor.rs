//! Singleton management for the background sampler.
//!
//! The running sampler is identified by the PID recorded in `listener.pid`.
//! `listen` is an explicit two-step protocol: terminate whatever the PID file
//! names, then spawn a fresh detached sampler and record its PID.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result, bail};
use tracing::{info, warn};

use crate::config::Config;
use crate::utils::context::Context;

/// Hidden subcommand that runs the sampler in the foreground.
pub const SAMPLE_COMMAND: &str = "sample";

/// How long to wait for a previous sampler to exit after SIGTERM.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);
const KILL_TIMEOUT: Duration = Duration::from_secs(1);
const STOP_POLL: Duration = Duration::from_millis(50);

/// Read the PID file. Missing or malformed files yield `None`.
pub fn read_pid(path: &Path) -> Option<u32> {
    let raw = fs::read_to_string(path).ok()?;
    raw.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
}

fn write_pid(path: &Path, pid: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, format!("{pid}\n")).with_context(|| format!("Failed to write PID file {}", path.display()))
}

fn remove_pid_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove PID file {}: {}", path.display(), e);
        }
    }
}

/// PID of the recorded sampler if that process is still alive and is a
/// sampler for this config directory.
pub fn running_pid(config: &Config) -> Option<u32> {
    read_pid(&config.pid_path()).filter(|pid| is_sampler(*pid, config))
}

fn is_sampler(pid: u32, config: &Config) -> bool {
    platform::is_alive(pid) && platform::runs_sampler(pid, config)
}

/// Whether a raw `/proc/<pid>/cmdline` belongs to a sampler started for
/// `config`: argv[0] names the same executable, the arguments include the
/// sample subcommand and the same `--config-dir`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn cmdline_matches(cmdline: &[u8], exe_name: &OsStr, config: &Config) -> bool {
    let args: Vec<&OsStr> = cmdline
        .split(|b| *b == 0)
        .filter(|a| !a.is_empty())
        .map(os_str_from_bytes)
        .collect();
    let Some((argv0, rest)) = args.split_first() else {
        return false;
    };

    let same_exe = Path::new(argv0).file_name() == Some(exe_name);
    let samples = rest.iter().any(|a| *a == OsStr::new(SAMPLE_COMMAND));
    let same_dir = rest
        .windows(2)
        .any(|w| w[0] == OsStr::new("--config-dir") && Path::new(w[1]) == config.config_dir());
    same_exe && samples && same_dir
}

#[cfg(unix)]
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn os_str_from_bytes(bytes: &[u8]) -> &OsStr {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(bytes)
}

#[cfg(not(unix))]
#[allow(dead_code)]
fn os_str_from_bytes(bytes: &[u8]) -> &OsStr {
    OsStr::new(std::str::from_utf8(bytes).unwrap_or_default())
}

fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while platform::is_alive(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(STOP_POLL);
    }
    true
}

/// Terminate the recorded sampler, if any, and remove the PID file.
///
/// Returns the PID that was stopped. A stale PID file, including one whose
/// PID now belongs to an unrelated process, is removed without signalling.
pub fn stop(config: &Config) -> Result<Option<u32>> {
    let pid_path = config.pid_path();
    let Some(pid) = read_pid(&pid_path) else {
        remove_pid_file(&pid_path);
        return Ok(None);
    };

    let stopped = if is_sampler(pid, config) {
        info!("Stopping sampler pid {}", pid);
        platform::terminate(pid)?;
        if !wait_for_exit(pid, STOP_TIMEOUT) {
            warn!("Sampler pid {} ignored SIGTERM, killing", pid);
            platform::kill(pid)?;
            if !wait_for_exit(pid, KILL_TIMEOUT) {
                bail!("Sampler pid {} is still running after SIGKILL", pid);
            }
        }
        Some(pid)
    } else {
        info!("Removing stale PID file for pid {}", pid);
        None
    };

    remove_pid_file(&pid_path);
    Ok(stopped)
}

/// Replace any running sampler with a new detached one. Returns its PID.
pub fn listen(config: &Config) -> Result<u32> {
    if let Some(pid) = stop(config)? {
        info!("Terminated previous sampler pid {}", pid);
    }

    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let mut command = Command::new(&exe);
    command
        .args(config.to_args())
        .arg(SAMPLE_COMMAND)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    platform::detach(&mut command);

    let child = command
        .spawn()
        .with_context(|| format!("Error starting clipboard listener from {}", exe.display()))?;
    let pid = child.id();
    write_pid(&config.pid_path(), pid)?;
    info!("Started sampler pid {}", pid);
    Ok(pid)
}

/// Record the current process as the sampler.
///
/// The returned guard removes the PID file on drop, unless another sampler
/// has replaced it in the meantime.
pub fn register(config: &Config) -> Result<Context<impl FnOnce() + use<>>> {
    let pid_path = config.pid_path();
    let pid = std::process::id();
    write_pid(&pid_path, pid)?;

    Ok(Context::with(move || {
        if read_pid(&pid_path) == Some(pid) {
            remove_pid_file(&pid_path);
        }
    }))
}

#[cfg(unix)]
mod platform {
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    use crate::config::Config;

    use anyhow::{Context as _, Result};
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    fn pid(raw: u32) -> Option<Pid> {
        i32::try_from(raw).ok().map(Pid::from_raw)
    }

    pub fn is_alive(raw: u32) -> bool {
        match pid(raw) {
            // Signal 0 only checks existence; EPERM still means "exists".
            Some(pid) => matches!(signal::kill(pid, None), Ok(()) | Err(Errno::EPERM)),
            None => false,
        }
    }

    fn send(raw: u32, sig: Signal) -> Result<()> {
        let Some(pid) = pid(raw) else {
            return Ok(());
        };
        match signal::kill(pid, sig) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to send {:?} to pid {}", sig, raw)),
        }
    }

    pub fn terminate(raw: u32) -> Result<()> {
        send(raw, Signal::SIGTERM)
    }

    pub fn kill(raw: u32) -> Result<()> {
        send(raw, Signal::SIGKILL)
    }

    /// Own process group, so the terminal's SIGINT/SIGHUP do not reach it.
    pub fn detach(command: &mut Command) {
        command.process_group(0);
    }

    #[cfg(target_os = "linux")]
    pub fn runs_sampler(raw: u32, config: &Config) -> bool {
        let Ok(cmdline) = std::fs::read(format!("/proc/{raw}/cmdline")) else {
            return false;
        };
        let exe = match std::env::current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                tracing::warn!("Cannot resolve own executable, trusting PID file: {}", e);
                return true;
            }
        };
        match exe.file_name() {
            Some(name) => super::cmdline_matches(&cmdline, name, config),
            None => false,
        }
    }

    /// Without procfs the command line cannot be inspected; a live PID is
    /// taken at its word.
    #[cfg(not(target_os = "linux"))]
    pub fn runs_sampler(_raw: u32, _config: &Config) -> bool {
        true
    }
}

#[cfg(not(unix))]
mod platform {
    use std::process::Command;

    use anyhow::{Result, bail};

    use crate::config::Config;

    pub fn is_alive(_raw: u32) -> bool {
        false
    }

    pub fn terminate(raw: u32) -> Result<()> {
        bail!("Stopping pid {raw} is only supported on Unix")
    }

    pub fn kill(raw: u32) -> Result<()> {
        terminate(raw)
    }

    pub fn detach(_command: &mut Command) {}

    pub fn runs_sampler(_raw: u32, _config: &Config) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> Config {
        Config::new(Some(dir.to_path_buf()), 50, 100).unwrap()
    }

    #[test]
    fn test_read_pid_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listener.pid");

        assert_eq!(read_pid(&path), None);
        fs::write(&path, "4242\n").unwrap();
        assert_eq!(read_pid(&path), Some(4242));
        fs::write(&path, "not a pid").unwrap();
        assert_eq!(read_pid(&path), None);
        fs::write(&path, "0").unwrap();
        assert_eq!(read_pid(&path), None);
    }

    #[test]
    fn test_register_writes_and_releases() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let guard = register(&config).unwrap();
        assert_eq!(read_pid(&config.pid_path()), Some(std::process::id()));

        drop(guard);
        assert!(!config.pid_path().exists());
    }

    #[test]
    fn test_register_guard_leaves_replaced_file() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let guard = register(&config).unwrap();
        fs::write(config.pid_path(), "999999\n").unwrap();
        drop(guard);

        assert_eq!(read_pid(&config.pid_path()), Some(999999));
    }

    #[test]
    fn test_stop_without_pid_file() {
        let dir = tempdir().unwrap();
        assert_eq!(stop(&config_in(dir.path())).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_removes_stale_pid_file() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        // Spawn and reap a short-lived process so its PID is known dead.
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        fs::write(config.pid_path(), format!("{pid}")).unwrap();

        assert_eq!(stop(&config).unwrap(), None);
        assert!(!config.pid_path().exists());
    }

    /// A shell that looks like `<this exe> ... sample` on its command line.
    #[cfg(unix)]
    fn spawn_fake_sampler(config: &Config, script: &str) -> std::process::Child {
        use std::os::unix::process::CommandExt;

        let exe = std::env::current_exe().unwrap();
        Command::new("sh")
            .arg0(&exe)
            .arg("-c")
            .arg(script)
            .arg("sh")
            .args(config.to_args())
            .arg(SAMPLE_COMMAND)
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_terminates_running_process() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let mut child = spawn_fake_sampler(&config, "sleep 30; exit 0");
        let pid = child.id();
        fs::write(config.pid_path(), format!("{pid}")).unwrap();
        // Give the shell time to start before its command line is inspected.
        thread::sleep(Duration::from_millis(100));
        assert_eq!(running_pid(&config), Some(pid));

        // Reap from another thread so the process does not linger as a zombie.
        let reaper = thread::spawn(move || child.wait());

        assert_eq!(stop(&config).unwrap(), Some(pid));
        assert!(!config.pid_path().exists());
        assert!(!reaper.join().unwrap().unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_kills_sampler_ignoring_sigterm() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let mut child = spawn_fake_sampler(&config, "trap '' TERM; sleep 30; exit 0");
        let pid = child.id();
        fs::write(config.pid_path(), format!("{pid}")).unwrap();
        thread::sleep(Duration::from_millis(100));

        let reaper = thread::spawn(move || child.wait());

        assert_eq!(stop(&config).unwrap(), Some(pid));
        assert!(!platform::is_alive(pid));
        assert!(!reaper.join().unwrap().unwrap().success());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stop_leaves_unrelated_process_alone() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        // The PID file names a live process that is not a sampler.
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        fs::write(config.pid_path(), format!("{pid}")).unwrap();

        assert_eq!(running_pid(&config), None);
        assert_eq!(stop(&config).unwrap(), None);
        assert!(!config.pid_path().exists());
        assert!(child.try_wait().unwrap().is_none());

        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_cmdline_matching() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let exe = OsStr::new("clipboard");

        let cmdline = |args: &[&str]| -> Vec<u8> {
            let mut raw = Vec::new();
            for arg in args {
                raw.extend_from_slice(arg.as_bytes());
                raw.push(0);
            }
            raw
        };
        let dir_arg = dir.path().to_str().unwrap();

        let sampler = cmdline(&["/usr/local/bin/clipboard", "--config-dir", dir_arg, "sample"]);
        assert!(cmdline_matches(&sampler, exe, &config));

        let other_dir = cmdline(&["/usr/local/bin/clipboard", "--config-dir", "/elsewhere", "sample"]);
        assert!(!cmdline_matches(&other_dir, exe, &config));

        let browser = cmdline(&["/usr/local/bin/clipboard", "--config-dir", dir_arg]);
        assert!(!cmdline_matches(&browser, exe, &config));

        let foreign = cmdline(&["/usr/bin/vim", "--config-dir", dir_arg, "sample"]);
        assert!(!cmdline_matches(&foreign, exe, &config));

        assert!(!cmdline_matches(b"", exe, &config));
    }
}
