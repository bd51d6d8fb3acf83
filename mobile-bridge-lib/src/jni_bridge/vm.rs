//! `JavaVM` seen through the invocation interface.
//!
//! The attachment calls go straight to the VM function table so that the guard in
//! [`crate::attach`] alone decides when a thread is detached.

use std::os::raw::c_void;
use std::ptr;

use jni::sys::{self, jint};
use jni::JavaVM;

use crate::attach::{EnvLookup, ManagedRuntime};
use crate::error::{Error, Result};

pub struct JniRuntime {
    vm: JavaVM,
}

impl JniRuntime {
    pub fn new(vm: JavaVM) -> Self {
        Self { vm }
    }

    fn raw(&self) -> *mut sys::JavaVM {
        self.vm.get_java_vm_pointer()
    }
}

impl ManagedRuntime for JniRuntime {
    type Env = *mut sys::JNIEnv;

    fn get_env(&self, version: jint) -> EnvLookup<Self::Env> {
        let vm = self.raw();
        let mut env: *mut c_void = ptr::null_mut();
        let code = unsafe {
            match (**vm).GetEnv {
                Some(get_env) => get_env(vm, &mut env, version),
                None => return EnvLookup::Failed(sys::JNI_ERR),
            }
        };
        match code {
            sys::JNI_OK if !env.is_null() => EnvLookup::Attached(env as *mut sys::JNIEnv),
            sys::JNI_EDETACHED => EnvLookup::Detached,
            sys::JNI_EVERSION => EnvLookup::UnsupportedVersion,
            other => EnvLookup::Failed(other),
        }
    }

    fn attach_current_thread(&self) -> Result<Self::Env> {
        let vm = self.raw();
        let mut env: *mut c_void = ptr::null_mut();
        let attach = unsafe { (**vm).AttachCurrentThread }
            .ok_or_else(|| Error::runtime("VM has no AttachCurrentThread"))?;
        let code = unsafe { attach(vm, &mut env, ptr::null_mut()) };
        if code != sys::JNI_OK || env.is_null() {
            return Err(Error::runtime(format!(
                "AttachCurrentThread failed with code {}",
                code
            )));
        }
        Ok(env as *mut sys::JNIEnv)
    }

    fn detach_current_thread(&self) {
        let vm = self.raw();
        unsafe {
            if let Some(detach) = (**vm).DetachCurrentThread {
                detach(vm);
            }
        }
    }
}
