//! 共享总线
//!
//! 同一条 CAN 总线上的所有电机共用一个适配器。每次请求持有锁完成
//! “发送全部帧 → 接收一帧回复”，保证同一时刻总线上只有一个未完成的请求，
//! 回复不会被错配给下一条指令。

use crate::{AkFrame, CanAdapter, CanError};
use ak_protocol::id_echo;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// 单次请求前最多清理的积压帧数（总线持续繁忙时不无限等待）
const MAX_STALE_FRAMES: usize = 64;

/// 串行化的请求/应答总线句柄
///
/// 显式构造、显式共享（`Arc<CanBus<A>>`），没有全局单例。
pub struct CanBus<A> {
    adapter: Mutex<A>,
}

impl<A: CanAdapter> CanBus<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter: Mutex::new(adapter),
        }
    }

    /// 创建可在多个控制器之间共享的句柄
    pub fn shared(adapter: A) -> Arc<Self> {
        Arc::new(Self::new(adapter))
    }

    /// 发送一组数据帧并等待该设备的一帧回复
    ///
    /// - 发送前丢弃接收队列中已有的帧（如上一条超时指令的迟到回复）
    /// - 相邻两帧之间至少等待 `inter_frame_delay`（硬件稳定时间）
    /// - 回复按 id 回显字节（`data[0] == device_id & 0xFF`）归属；
    ///   其他设备或无法归属的帧被丢弃，继续等待直到 `timeout` 截止
    ///
    /// # 错误
    /// - `CanError::Timeout`: 截止前未收到本设备的回复
    /// - 适配器返回的其他错误原样透传
    pub fn request(
        &self,
        device_id: u16,
        frames: &[[u8; 8]],
        inter_frame_delay: Duration,
        timeout: Duration,
    ) -> Result<AkFrame, CanError> {
        let mut adapter = self.adapter.lock();

        discard_stale(&mut *adapter, device_id)?;

        for (index, data) in frames.iter().enumerate() {
            if index > 0 && !inter_frame_delay.is_zero() {
                spin_sleep::sleep(inter_frame_delay);
            }
            let frame = AkFrame::new_standard(device_id, data);
            adapter.send(frame)?;
            trace!(
                "TX id=0x{:03X} data={}",
                device_id,
                hex::encode_upper(frame.data_slice())
            );
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CanError::Timeout);
            }

            let frame = adapter.receive_timeout(remaining)?;
            if is_reply_for(&frame, device_id) {
                trace!(
                    "RX id=0x{:03X} data={} (device 0x{:03X})",
                    frame.id,
                    hex::encode_upper(frame.data_slice()),
                    device_id
                );
                return Ok(frame);
            }

            warn!(
                "Discarding frame id=0x{:X} data={} while waiting for device 0x{:03X}",
                frame.id,
                hex::encode_upper(frame.data_slice()),
                device_id
            );
        }
    }
}

/// 清空发送前已积压的帧，这些帧不属于本次请求
fn discard_stale<A: CanAdapter>(adapter: &mut A, device_id: u16) -> Result<(), CanError> {
    for _ in 0..MAX_STALE_FRAMES {
        let Some(frame) = adapter.try_receive()? else {
            return Ok(());
        };
        warn!(
            "Discarding stale frame id=0x{:X} data={} before request to device 0x{:03X}",
            frame.id,
            hex::encode_upper(frame.data_slice()),
            device_id
        );
    }
    Ok(())
}

/// 回复归属判断：只接受标准帧且 id 回显与设备号低 8 位一致
fn is_reply_for(frame: &AkFrame, device_id: u16) -> bool {
    !frame.is_extended && id_echo(frame.data_slice()) == Some((device_id & 0xFF) as u8)
}
