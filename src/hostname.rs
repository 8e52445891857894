//! Local hostname lookup used as the default `HOSTNAME` field.

use std::io;

use once_cell::sync::Lazy;

/// Hostname written when the collector is reached over a Unix socket.
pub const UNIX_SOCKET_HOSTNAME: &str = "localhost";

static LOCAL_HOSTNAME: Lazy<io::Result<String>> = Lazy::new(lookup);

/// Return the machine hostname, resolved once per process.
pub fn local_hostname() -> io::Result<String> {
    match &*LOCAL_HOSTNAME {
        Ok(name) => Ok(name.clone()),
        Err(err) => Err(io::Error::new(err.kind(), err.to_string())),
    }
}

#[cfg(unix)]
fn lookup() -> io::Result<String> {
    // POSIX caps host names at HOST_NAME_MAX bytes; 255 covers every platform we run on.
    let mut buffer = vec![0u8; 256];
    let rc = unsafe { libc::gethostname(buffer.as_mut_ptr().cast::<libc::c_char>(), buffer.len()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    // The name may be truncated without a trailing NUL.
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    buffer.truncate(end);
    String::from_utf8(buffer).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(not(unix))]
fn lookup() -> io::Result<String> {
    std::env::var("COMPUTERNAME")
        .map_err(|err| io::Error::new(io::ErrorKind::NotFound, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_not_empty() {
        let name = local_hostname().expect("hostname lookup");
        assert!(!name.is_empty());
        assert!(!name.contains('\0'));
    }
}
