/*
 * keysel - keyselib POSIX libc time interface
 *
 * Copyright 2020 Manos Pitsidianakis
 *
 * This file is part of keysel.
 *
 * keysel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * keysel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with keysel. If not, see <http://www.gnu.org/licenses/>.
 */

//! Functions for formatting UNIX Epoch timestamps, such as key creation and
//! expiration dates.
//!
//! # Examples
//!
//! ```rust
//! # use keyselib::utils::datetime::*;
//! let timestamp: UnixTimestamp = 1578509043;
//!
//! let s = timestamp_to_string_utc(timestamp, Some("%Y-%m-%d"), true);
//! assert_eq!(s, "2020-01-08");
//! ```
use std::{
    borrow::Cow,
    convert::TryInto,
    ffi::{CStr, CString},
    os::raw::c_int,
};

use crate::error::{Error, ErrorKind, Result, ResultIntoError};

pub type UnixTimestamp = u64;

pub mod formats {
    /// `<date>`T`<time>`
    pub const RFC3339_DATETIME: &str = "%Y-%m-%dT%H:%M:%S\0";
    /// `<date>`T`<time>`
    pub const RFC3339_DATETIME_AND_SPACE: &str = "%Y-%m-%d %H:%M:%S\0";

    pub const RFC3339_DATE: &str = "%Y-%m-%d\0";

    pub const DEFAULT_FMT: &str = "%a, %d %b %Y %R\0";
    /// The locale's appropriate date and time representation, what
    /// `nl_langinfo(D_T_FMT)` returns.
    pub const LOCALE_DATETIME: &str = "%c\0";
}

use formats as fmt;

extern "C" {
    fn strftime(
        s: *mut std::os::raw::c_char,
        max: libc::size_t,
        format: *const std::os::raw::c_char,
        tm: *const libc::tm,
    ) -> libc::size_t;

    fn localtime_r(timep: *const libc::time_t, tm: *mut libc::tm) -> *mut libc::tm;

    fn gmtime_r(timep: *const libc::time_t, tm: *mut libc::tm) -> *mut libc::tm;
}

#[cfg(not(target_os = "openbsd"))]
#[repr(i32)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
enum LocaleCategoryMask {
    Time = libc::LC_TIME_MASK,
    All = libc::LC_ALL_MASK,
}

#[cfg(target_os = "openbsd")]
const _LC_LAST: c_int = 7;

#[cfg(target_os = "openbsd")]
#[repr(i32)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
enum LocaleCategoryMask {
    Time = 1 << libc::LC_TIME,
    All = (1 << _LC_LAST) - 2,
}

#[repr(i32)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
enum LocaleCategory {
    Time = libc::LC_TIME,
    All = libc::LC_ALL,
}

#[cfg(not(target_os = "netbsd"))]
#[allow(dead_code)]
struct Locale {
    mask: LocaleCategoryMask,
    category: LocaleCategory,
    new: libc::locale_t,
    old: libc::locale_t,
}

#[cfg(target_os = "netbsd")]
#[allow(dead_code)]
struct Locale {
    mask: LocaleCategoryMask,
    category: LocaleCategory,
    old: *const std::os::raw::c_char,
}

impl Drop for Locale {
    fn drop(&mut self) {
        #[cfg(not(target_os = "netbsd"))]
        unsafe {
            let _ = libc::uselocale(self.old);
            libc::freelocale(self.new);
        }
        #[cfg(target_os = "netbsd")]
        unsafe {
            let _ = libc::setlocale(self.category as c_int, self.old);
        }
    }
}

// How to unit test this? Test machine is not guaranteed to have non-english
// locales.
impl Locale {
    #[cfg(not(target_os = "netbsd"))]
    fn new(
        mask: LocaleCategoryMask,
        category: LocaleCategory,
        locale: *const std::os::raw::c_char,
        base: libc::locale_t,
    ) -> Result<Self> {
        let new = unsafe { libc::newlocale(mask as c_int, locale, base) };
        if new.is_null() {
            return Err(nix::Error::last().into());
        }
        let old = unsafe { libc::uselocale(new) };
        if old.is_null() {
            unsafe { libc::freelocale(new) };
            return Err(nix::Error::last().into());
        }
        Ok(Self {
            mask,
            category,
            new,
            old,
        })
    }

    #[cfg(target_os = "netbsd")]
    fn new(
        mask: LocaleCategoryMask,
        category: LocaleCategory,
        locale: *const std::os::raw::c_char,
        _base: libc::locale_t,
    ) -> Result<Self> {
        let old = unsafe { libc::setlocale(category as c_int, std::ptr::null_mut()) };
        if old.is_null() {
            return Err(nix::Error::last().into());
        }
        let new = unsafe { libc::setlocale(category as c_int, locale) };
        if new.is_null() {
            return Err(nix::Error::last().into());
        }
        Ok(Self {
            mask,
            category,
            old,
        })
    }
}

#[inline]
fn timestamp_to_string_inner(
    timestamp: UnixTimestamp,
    fmt: Option<&str>,
    posix: bool,
    local: bool,
) -> String {
    let mut new_tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        let i: libc::time_t = timestamp.try_into().unwrap_or(0);
        if local {
            localtime_r(std::ptr::addr_of!(i), std::ptr::addr_of_mut!(new_tm));
        } else {
            gmtime_r(std::ptr::addr_of!(i), std::ptr::addr_of_mut!(new_tm));
        }
    }
    let format: Cow<'_, CStr> = if let Some(cs) = fmt
        .map(str::as_bytes)
        .map(CStr::from_bytes_with_nul)
        .and_then(|res| res.ok())
    {
        Cow::from(cs)
    } else if let Some(cstring) = fmt
        .map(str::as_bytes)
        .map(CString::new)
        .and_then(|res| res.ok())
    {
        Cow::from(cstring)
    } else {
        unsafe { CStr::from_bytes_with_nul_unchecked(fmt::DEFAULT_FMT.as_bytes()).into() }
    };

    let mut vec: [u8; 256] = [0; 256];
    let ret = {
        let _with_locale: Option<Result<Locale>> = if posix {
            Some(
                Locale::new(
                    LocaleCategoryMask::Time,
                    LocaleCategory::Time,
                    b"C\0".as_ptr() as *const std::os::raw::c_char,
                    std::ptr::null_mut(),
                )
                .chain_err_summary(|| "Could not set locale for datetime conversion")
                .chain_err_kind(crate::error::ErrorKind::External),
            )
        } else {
            None
        };

        unsafe {
            strftime(
                vec.as_mut_ptr() as *mut _,
                256,
                format.as_ptr(),
                std::ptr::addr_of!(new_tm),
            )
        }
    };

    String::from_utf8_lossy(&vec[0..ret]).into_owned()
}

/// Return a UNIX epoch timestamp as string in the local timezone, using `fmt`
/// as the format argument passed to `strftime`. If `posix` is true, the `C`
/// locale is used instead of the user's.
pub fn timestamp_to_string(timestamp: UnixTimestamp, fmt: Option<&str>, posix: bool) -> String {
    timestamp_to_string_inner(timestamp, fmt, posix, true)
}

/// Return a UNIX epoch timestamp as string in the UTC/GMT/+00:00 timezone,
/// using `fmt` as the format argument passed to `strftime`.
pub fn timestamp_to_string_utc(timestamp: UnixTimestamp, fmt: Option<&str>, posix: bool) -> String {
    timestamp_to_string_inner(timestamp, fmt, posix, false)
}

/// Load the user's locale from `LC_ALL`, `LC_TIME` and `LANG`, so that
/// timestamps formatted with `posix == false` follow it. The process starts
/// in the `C` locale otherwise.
pub fn init_locale() -> Result<()> {
    let ret = unsafe { libc::setlocale(libc::LC_ALL, b"\0".as_ptr().cast()) };
    if ret.is_null() {
        return Err(
            Error::new("Could not set locale from the environment").set_kind(ErrorKind::Platform)
        );
    }
    Ok(())
}

pub fn now() -> UnixTimestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
