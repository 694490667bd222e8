//! SocketCAN 适配器
//!
//! Linux 内核 CAN 接口。波特率与接口启停由 `ip link` 完成，不在应用层设置。
//!
//! - 打开前通过 `/sys/class/net/<iface>/flags` 检查接口存在且为 UP
//! - 关闭 loopback，避免自己发出的指令被当作回复读回
//! - 接收时过滤错误帧，Bus-Off 作为错误上报

use crate::{AkFrame, CanAdapter, CanError};
use socketcan::{
    CanError as SocketCanError, CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Frame, Socket,
    StandardId,
};
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// 内核拒绝零超时，接收超时至少 1 µs
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// IFNAMSIZ - 1
const MAX_IFACE_NAME_LEN: usize = 15;

const SYSFS_NET: &str = "/sys/class/net";

/// 读取 `/sys/class/net/<iface>/flags`，返回 IFF_UP 是否置位
///
/// # 错误
/// - `CanError::Device`: 接口名无效或接口不存在
/// - `CanError::Io`: sysfs 读取失败
pub fn interface_is_up(interface: &str) -> Result<bool, CanError> {
    if interface.is_empty()
        || interface.len() > MAX_IFACE_NAME_LEN
        || interface.contains(['/', '\0'])
        || interface == "."
        || interface == ".."
    {
        return Err(CanError::Device(format!(
            "Invalid CAN interface name '{}' (1..={} characters, no '/' or NUL)",
            interface.escape_debug(),
            MAX_IFACE_NAME_LEN
        )));
    }

    let path = Path::new(SYSFS_NET).join(interface).join("flags");
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CanError::Device(format!(
                "CAN interface '{}' not found. Create it first:\n  sudo ip link add dev {} type can",
                interface, interface
            )));
        },
        Err(e) => return Err(CanError::Io(e)),
    };

    let digits = content.trim().trim_start_matches("0x");
    let flags = u32::from_str_radix(digits, 16).map_err(|e| {
        CanError::Device(format!(
            "Unreadable flags '{}' for interface '{}': {}",
            content.trim(),
            interface,
            e
        ))
    })?;
    Ok(flags & libc::IFF_UP as u32 != 0)
}

/// SocketCAN 适配器
///
/// # 示例
///
/// ```no_run
/// use ak_can::{AkFrame, CanAdapter, SocketCanAdapter};
/// use std::time::Duration;
///
/// let mut adapter = SocketCanAdapter::new("can0").unwrap();
/// adapter.send(AkFrame::new_standard(0x01, &[0xFF; 8])).unwrap();
/// let reply = adapter.receive_timeout(Duration::from_millis(50)).unwrap();
/// ```
pub struct SocketCanAdapter {
    socket: CanSocket,
    interface: String,
    read_timeout: Option<Duration>,
}

impl SocketCanAdapter {
    /// 打开 SocketCAN 接口
    ///
    /// # 错误
    /// - `CanError::Device`: 接口不存在、未启动或打开失败
    /// - `CanError::Io`: 系统调用失败
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();

        if !interface_is_up(&interface)? {
            return Err(CanError::Device(format!(
                "CAN interface '{}' exists but is not UP. Start it first:\n  sudo ip link set up {}",
                interface, interface
            )));
        }

        let socket = CanSocket::open(&interface).map_err(|e| {
            CanError::Device(format!("Failed to open CAN interface '{}': {}", interface, e))
        })?;

        let loopback_enabled: libc::c_int = 0;
        let ret = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::SOL_CAN_RAW,
                libc::CAN_RAW_LOOPBACK,
                &loopback_enabled as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            warn!(
                "Failed to disable CAN_RAW_LOOPBACK on '{}': {}",
                interface,
                io::Error::last_os_error()
            );
        }

        trace!("SocketCAN interface '{}' opened", interface);
        Ok(Self {
            socket,
            interface,
            read_timeout: None,
        })
    }

    /// 接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), CanError> {
        let timeout = timeout.max(MIN_READ_TIMEOUT);
        if self.read_timeout != Some(timeout) {
            self.socket.set_read_timeout(timeout).map_err(CanError::Io)?;
            self.read_timeout = Some(timeout);
        }
        Ok(())
    }

    fn to_can_frame(frame: &AkFrame) -> Result<CanFrame, CanError> {
        let built = if frame.is_extended {
            ExtendedId::new(frame.id).and_then(|id| CanFrame::new(id, frame.data_slice()))
        } else {
            u16::try_from(frame.id)
                .ok()
                .and_then(StandardId::new)
                .and_then(|id| CanFrame::new(id, frame.data_slice()))
        };
        built.ok_or_else(|| {
            CanError::Device(format!("Failed to create CAN frame with ID 0x{:X}", frame.id))
        })
    }

    fn to_ak_frame(frame: &CanFrame) -> AkFrame {
        if frame.is_extended() {
            AkFrame::new_extended(frame.raw_id(), frame.data())
        } else {
            AkFrame::new_standard(frame.raw_id() as u16, frame.data())
        }
    }
}

impl CanAdapter for SocketCanAdapter {
    fn send(&mut self, frame: AkFrame) -> Result<(), CanError> {
        let can_frame = Self::to_can_frame(&frame)?;
        self.socket.write_frame(&can_frame).map_err(CanError::Io)?;
        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }

    /// 接收一帧数据帧；错误帧记录后跳过，直到超时
    fn receive_timeout(&mut self, timeout: Duration) -> Result<AkFrame, CanError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.set_read_timeout(remaining)?;

            let can_frame = match self.socket.read_frame() {
                Ok(f) => f,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Err(CanError::Timeout);
                },
                Err(e) => return Err(CanError::Io(e)),
            };

            match can_frame {
                CanFrame::Error(error_frame) => {
                    let error = SocketCanError::from(error_frame);
                    if matches!(error, SocketCanError::BusOff) {
                        warn!("CAN Bus Off detected on '{}'", self.interface);
                        return Err(CanError::BusOff);
                    }
                    warn!("CAN Error Frame received: {}, ignoring", error);
                },
                CanFrame::Remote(remote) => {
                    trace!("Ignoring remote frame ID=0x{:X}", remote.raw_id());
                },
                CanFrame::Data(_) => {
                    let frame = Self::to_ak_frame(&can_frame);
                    trace!("Received CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
                    return Ok(frame);
                },
            }

            if Instant::now() >= deadline {
                return Err(CanError::Timeout);
            }
        }
    }
}
