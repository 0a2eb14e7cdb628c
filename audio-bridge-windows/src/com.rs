//! Scoped COM resources.

use std::ffi::c_void;

use windows::Win32::System::Com::*;

use audio_bridge_core::models::error::BridgeError;

/// Keeps COM initialized (multithreaded apartment) until dropped.
pub(crate) struct ComGuard;

impl ComGuard {
    pub(crate) fn init_multithreaded() -> Result<Self, BridgeError> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| BridgeError::InitializationFailed(format!("CoInitializeEx failed: {}", e)))?;
        }
        Ok(Self)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

/// Owns a `CoTaskMemAlloc` allocation returned by a COM call and frees it on drop.
pub(crate) struct CoTaskMem<T> {
    ptr: *mut T,
}

impl<T> CoTaskMem<T> {
    /// # Safety
    /// `ptr` must be null or a live `CoTaskMemAlloc` allocation holding a `T`
    /// that nothing else frees.
    pub(crate) unsafe fn from_raw(ptr: *mut T) -> Self {
        Self { ptr }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> Drop for CoTaskMem<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                CoTaskMemFree(Some(self.ptr as *const c_void));
            }
        }
    }
}
