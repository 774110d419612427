//! Single-instance guard.
//!
//! Acquired once at startup and held for the life of the process.  On
//! Windows this is a named mutex; elsewhere a PID lock file in the temp
//! directory, treated as stale when the recorded process is gone.

use thiserror::Error;
use tracing::{debug, error};

/// Name of the system-wide instance mutex.
pub const INSTANCE_NAME: &str = "AutoCopyAgent";

/// Message shown when a second instance is started.
pub const ALREADY_RUNNING_MESSAGE: &str = "Application is already running!";

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("another instance is already running")]
    AlreadyRunning,
    #[error("failed to acquire instance lock: {0}")]
    Platform(String),
}

/// Held for as long as this process is the single instance.
pub struct InstanceGuard {
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
    #[cfg(not(target_os = "windows"))]
    lock_path: std::path::PathBuf,
}

// SAFETY: the mutex handle is only released from Drop; handles are
// process-wide and usable from any thread.
#[cfg(target_os = "windows")]
unsafe impl Send for InstanceGuard {}

impl InstanceGuard {
    /// Tries to become the single instance named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::AlreadyRunning`] when another live process
    /// holds the guard.
    #[cfg(target_os = "windows")]
    pub fn acquire(name: &str) -> Result<Self, InstanceError> {
        use windows::core::{HSTRING, PCWSTR};
        use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS};
        use windows::Win32::System::Threading::CreateMutexW;

        let wide = HSTRING::from(format!("Local\\{name}"));
        // SAFETY: default security, initially owned, NUL-terminated name.
        let handle = unsafe { CreateMutexW(None, true, PCWSTR(wide.as_ptr())) }
            .map_err(|e| InstanceError::Platform(e.to_string()))?;
        // SAFETY: read immediately after CreateMutexW on this thread.
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            // SAFETY: handle was returned by CreateMutexW.
            let _ = unsafe { CloseHandle(handle) };
            return Err(InstanceError::AlreadyRunning);
        }
        debug!(name, "instance mutex acquired");
        Ok(Self { handle })
    }

    /// Tries to become the single instance named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::AlreadyRunning`] when another live process
    /// holds the guard.
    #[cfg(not(target_os = "windows"))]
    pub fn acquire(name: &str) -> Result<Self, InstanceError> {
        Self::acquire_at(std::env::temp_dir().join(format!("{name}.lock")))
    }

    #[cfg(not(target_os = "windows"))]
    fn acquire_at(lock_path: std::path::PathBuf) -> Result<Self, InstanceError> {
        use std::io::Write;

        if let Ok(content) = std::fs::read_to_string(&lock_path) {
            if let Ok(pid) = content.trim().parse::<u32>() {
                if pid != std::process::id() && process_alive(pid) {
                    return Err(InstanceError::AlreadyRunning);
                }
            }
            debug!(path = %lock_path.display(), "replacing stale instance lock");
        }

        let mut file = std::fs::File::create(&lock_path)
            .map_err(|e| InstanceError::Platform(e.to_string()))?;
        write!(file, "{}", std::process::id()).map_err(|e| InstanceError::Platform(e.to_string()))?;
        debug!(path = %lock_path.display(), "instance lock acquired");
        Ok(Self { lock_path })
    }
}

#[cfg(all(not(target_os = "windows"), target_os = "linux"))]
fn process_alive(pid: u32) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(all(not(target_os = "windows"), not(target_os = "linux")))]
fn process_alive(_pid: u32) -> bool {
    // Without a cheap liveness check, a recorded PID is trusted.
    true
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        #[cfg(target_os = "windows")]
        {
            use windows::Win32::Foundation::CloseHandle;
            use windows::Win32::System::Threading::ReleaseMutex;
            // SAFETY: we own the mutex and the handle.
            unsafe {
                let _ = ReleaseMutex(self.handle);
                let _ = CloseHandle(self.handle);
            }
        }

        #[cfg(not(target_os = "windows"))]
        {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

/// Tells the user a second instance was refused.
pub fn report_already_running() {
    error!("{ALREADY_RUNNING_MESSAGE}");

    #[cfg(target_os = "windows")]
    {
        use windows::core::{w, HSTRING, PCWSTR};
        use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONINFORMATION, MB_OK};

        let text = HSTRING::from(ALREADY_RUNNING_MESSAGE);
        // SAFETY: both strings are NUL-terminated and outlive the call.
        unsafe {
            MessageBoxW(None, PCWSTR(text.as_ptr()), w!("AutoCopy"), MB_OK | MB_ICONINFORMATION);
        }
    }
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn lock_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("autocopy_instance_{}.lock", Uuid::new_v4()))
    }

    #[test]
    fn test_acquire_writes_pid_and_drop_removes_lock() {
        // Arrange
        let path = lock_path();

        // Act
        let guard = InstanceGuard::acquire_at(path.clone()).expect("first acquire");
        let recorded = std::fs::read_to_string(&path).unwrap();
        drop(guard);

        // Assert
        assert_eq!(recorded, std::process::id().to_string());
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_live_foreign_pid_blocks_second_instance() {
        // PID 1 always exists on Linux.
        let path = lock_path();
        std::fs::write(&path, "1").unwrap();

        let result = InstanceGuard::acquire_at(path.clone());

        assert!(matches!(result, Err(InstanceError::AlreadyRunning)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_garbage_lock_file_is_treated_as_stale() {
        let path = lock_path();
        std::fs::write(&path, "not a pid").unwrap();

        let guard = InstanceGuard::acquire_at(path.clone());

        assert!(guard.is_ok());
    }
}
