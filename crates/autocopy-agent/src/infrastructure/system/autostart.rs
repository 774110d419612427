//! Run-at-login registration.
//!
//! On Windows the agent registers itself under
//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` with a quoted path to
//! the current executable.  Removing a value that is not there is not an
//! error.  Other platforms log and do nothing.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::orchestrator::AutostartRegistrar;

/// Name of the value written under the `Run` key.
pub const RUN_VALUE_NAME: &str = "AutoCopy";

/// Path of the per-user `Run` key below `HKEY_CURRENT_USER`.
pub const RUN_KEY_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Error type for run-at-login registration.
#[derive(Debug, Error)]
pub enum AutostartError {
    #[error("could not determine executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),
    #[error("registry {operation} failed with code {code}")]
    Registry { operation: &'static str, code: u32 },
    #[error("run-at-login registration is not supported on this platform")]
    Unsupported,
}

/// The command line stored in the `Run` value: the executable path, quoted
/// so paths with spaces survive.
pub fn run_command_line(exe: &Path) -> String {
    format!("\"{}\"", exe.display())
}

/// Registrar for platforms without run-at-login support.
#[derive(Debug, Default)]
pub struct NoopAutostart;

impl AutostartRegistrar for NoopAutostart {
    fn set_registered(&self, enabled: bool) -> Result<(), AutostartError> {
        debug!(enabled, "run-at-login registration skipped on this platform");
        Ok(())
    }
}

/// Returns the registrar for the current platform.
pub fn platform_autostart() -> Arc<dyn AutostartRegistrar> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows_impl::RegistryAutostart)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(NoopAutostart)
    }
}

#[cfg(target_os = "windows")]
mod windows_impl {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
    use windows::Win32::System::Registry::{
        RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegSetValueExW, HKEY, HKEY_CURRENT_USER,
        KEY_SET_VALUE, REG_SZ,
    };

    use super::{run_command_line, AutostartError, RUN_KEY_PATH, RUN_VALUE_NAME};
    use crate::application::orchestrator::AutostartRegistrar;

    pub struct RegistryAutostart;

    fn check(operation: &'static str, status: WIN32_ERROR) -> Result<(), AutostartError> {
        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(AutostartError::Registry {
                operation,
                code: status.0,
            })
        }
    }

    /// Closes the key on drop.
    struct OpenKey(HKEY);

    impl Drop for OpenKey {
        fn drop(&mut self) {
            // SAFETY: the key was opened by RegOpenKeyExW below.
            let _ = unsafe { RegCloseKey(self.0) };
        }
    }

    impl AutostartRegistrar for RegistryAutostart {
        fn set_registered(&self, enabled: bool) -> Result<(), AutostartError> {
            let key_path = HSTRING::from(RUN_KEY_PATH);
            let value_name = HSTRING::from(RUN_VALUE_NAME);

            let mut raw = HKEY::default();
            // SAFETY: HKEY_CURRENT_USER is predefined; raw receives the handle.
            check("open", unsafe {
                RegOpenKeyExW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key_path.as_ptr()),
                    Some(0),
                    KEY_SET_VALUE,
                    &mut raw,
                )
            })?;
            let key = OpenKey(raw);

            if enabled {
                let exe = std::env::current_exe().map_err(AutostartError::ExecutablePath)?;
                let data: Vec<u8> = run_command_line(&exe)
                    .encode_utf16()
                    .chain(std::iter::once(0))
                    .flat_map(u16::to_le_bytes)
                    .collect();
                // SAFETY: data is a NUL-terminated UTF-16 string in bytes.
                check("set value", unsafe {
                    RegSetValueExW(key.0, PCWSTR(value_name.as_ptr()), Some(0), REG_SZ, Some(&data))
                })?;
                tracing::info!("registered to run at login");
            } else {
                // SAFETY: key is open with KEY_SET_VALUE.
                let status = unsafe { RegDeleteValueW(key.0, PCWSTR(value_name.as_ptr())) };
                if status != ERROR_FILE_NOT_FOUND {
                    check("delete value", status)?;
                    tracing::info!("removed run-at-login registration");
                }
            }
            Ok(())
        }
    }
}
