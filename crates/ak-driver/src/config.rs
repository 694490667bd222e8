//! 控制器配置

use std::time::Duration;

/// 控制器配置
///
/// # Example
///
/// ```
/// use ak_driver::ControllerConfig;
/// use std::time::Duration;
///
/// // 默认配置（50ms 接收超时，100µs 帧间隔，严格状态检查）
/// let config = ControllerConfig::default();
///
/// // 台架调试：放宽使能检查
/// let config = ControllerConfig::default()
///     .with_receive_timeout(Duration::from_millis(20))
///     .with_enforce_enabled(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// 等待状态回复的超时
    pub receive_timeout: Duration,
    /// 两帧连续发送之间的最小间隔（零点标定序列使用）
    pub inter_frame_delay: Duration,
    /// 为 true 时，未使能状态拒绝运动与标零指令
    pub enforce_enabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(50),
            inter_frame_delay: Duration::from_micros(100),
            enforce_enabled: true,
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    pub fn with_inter_frame_delay(mut self, delay: Duration) -> Self {
        self.inter_frame_delay = delay;
        self
    }

    pub fn with_enforce_enabled(mut self, enforce: bool) -> Self {
        self.enforce_enabled = enforce;
        self
    }
}
