//! Live registry backend over the Win32 registry API.

use std::iter::once;

use regkit::{Hive, RegError, RegResult, RegValue, RegistryAccess, RegistryKey, RegistryPath};
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegEnumValueW, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_CLASSES_ROOT,
    HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, REG_VALUE_TYPE,
};

/// Longest key name in UTF-16 units, terminator included.
const MAX_KEY_NAME: usize = 256;
/// Longest value name in UTF-16 units, terminator included.
const MAX_VALUE_NAME: usize = 16384;

fn predefined_key(hive: Hive) -> HKEY {
    match hive {
        Hive::ClassesRoot => HKEY_CLASSES_ROOT,
        Hive::CurrentUser => HKEY_CURRENT_USER,
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        Hive::Users => HKEY_USERS,
        Hive::CurrentConfig => HKEY_CURRENT_CONFIG,
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(once(0)).collect()
}

fn status_error(path: &str, status: WIN32_ERROR) -> RegError {
    if status == ERROR_ACCESS_DENIED {
        return RegError::AccessDenied(path.to_string());
    }
    let message = std::io::Error::from_raw_os_error(status.0 as i32).to_string();
    RegError::os(path, status.0, message)
}

/// An open registry handle, closed on drop.
struct OwnedKey(HKEY);

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful RegOpenKeyExW and is closed exactly once.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// The registry of the running Windows host, opened read-only.
#[derive(Debug, Default)]
pub struct Win32Registry;

impl Win32Registry {
    pub fn new() -> Self {
        Win32Registry
    }
}

impl RegistryAccess for Win32Registry {
    fn open_key(&self, hive: Hive, sub_key: &str) -> RegResult<Option<Box<dyn RegistryKey + '_>>> {
        let path = RegistryPath::new(hive, sub_key).full_path();
        let wide = to_wide(sub_key);
        let mut handle = HKEY::default();

        // SAFETY: `wide` is NUL-terminated and outlives the call; `handle` is a valid out pointer.
        let status = unsafe { RegOpenKeyExW(predefined_key(hive), PCWSTR(wide.as_ptr()), 0, KEY_READ, &mut handle) };

        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(status_error(&path, status));
        }
        Ok(Some(Box::new(Win32Key {
            handle: OwnedKey(handle),
            path,
        })))
    }

    fn backend_name(&self) -> &str {
        "win32"
    }
}

struct Win32Key {
    handle: OwnedKey,
    path: String,
}

impl Win32Key {
    /// Enumerate names with `enum_at(index, buffer, len)` until the API reports no more items.
    fn enumerate_names(
        &self,
        capacity: usize,
        enum_at: impl Fn(u32, &mut [u16], &mut u32) -> WIN32_ERROR,
    ) -> RegResult<Vec<String>> {
        let mut names = Vec::new();
        let mut buf = vec![0u16; capacity];
        for index in 0u32.. {
            let mut len = buf.len() as u32;
            let status = enum_at(index, &mut buf, &mut len);
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            if status != ERROR_SUCCESS {
                return Err(status_error(&self.path, status));
            }
            names.push(String::from_utf16_lossy(&buf[..len as usize]));
        }
        Ok(names)
    }
}

impl RegistryKey for Win32Key {
    fn subkey_names(&self) -> RegResult<Vec<String>> {
        let hkey = self.handle.0;
        self.enumerate_names(MAX_KEY_NAME, |index, buf, len| {
            // SAFETY: `buf` holds `*len` UTF-16 units; the optional out pointers are unused.
            unsafe { RegEnumKeyExW(hkey, index, PWSTR(buf.as_mut_ptr()), len, None, PWSTR::null(), None, None) }
        })
    }

    fn value_names(&self) -> RegResult<Vec<String>> {
        let hkey = self.handle.0;
        self.enumerate_names(MAX_VALUE_NAME, |index, buf, len| {
            // SAFETY: `buf` holds `*len` UTF-16 units; type and data are not requested.
            unsafe { RegEnumValueW(hkey, index, PWSTR(buf.as_mut_ptr()), len, None, None, None, None) }
        })
    }

    fn read_value(&self, name: &str) -> RegResult<Option<RegValue>> {
        let wide = to_wide(name);
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = 0u32;

        // SAFETY: size query only; `wide` is NUL-terminated.
        let status = unsafe {
            RegQueryValueExW(self.handle.0, PCWSTR(wide.as_ptr()), None, Some(&mut kind), None, Some(&mut size))
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(status_error(&self.path, status));
        }

        // The value can grow between the size query and the read.
        loop {
            let mut data = vec![0u8; size as usize];
            // SAFETY: `data` holds `size` bytes.
            let status = unsafe {
                RegQueryValueExW(
                    self.handle.0,
                    PCWSTR(wide.as_ptr()),
                    None,
                    Some(&mut kind),
                    Some(data.as_mut_ptr()),
                    Some(&mut size),
                )
            };
            if status == ERROR_MORE_DATA {
                continue;
            }
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(None);
            }
            if status != ERROR_SUCCESS {
                return Err(status_error(&self.path, status));
            }
            data.truncate(size as usize);
            return Ok(Some(RegValue::from_raw(kind.0, &data)));
        }
    }
}
