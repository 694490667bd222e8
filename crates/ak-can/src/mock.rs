//! Mock CAN 适配器（无硬件测试）
//!
//! 适配器本体交给 [`CanBus`](crate::CanBus)，测试代码保留 [`MockHandle`]
//! 用于注入回复与检查已发送帧。
//!
//! 两类注入：
//! - [`MockHandle::push_reply`]：电机对下一次发送的回复，发送后才可读
//! - [`MockHandle::push_received`]：已经在接收队列里的帧（迟到回复、其他设备）

use crate::{AkFrame, CanAdapter, CanError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

type Responder = Box<dyn FnMut(&AkFrame) -> Option<AkFrame> + Send>;

#[derive(Default)]
struct MockState {
    sent: Vec<(Instant, AkFrame)>,
    armed: VecDeque<AkFrame>,
    rx: VecDeque<AkFrame>,
    receive_calls: usize,
    drained: usize,
    responder: Option<Responder>,
    fail_sends: bool,
}

/// Mock 适配器：接收时从接收队列取帧，队列为空立即返回 `Timeout`
pub struct MockCanAdapter {
    state: Arc<Mutex<MockState>>,
}

/// 测试侧句柄
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockCanAdapter {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: AkFrame) -> Result<(), CanError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.fail_sends {
            return Err(CanError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock send failure",
            )));
        }
        state.sent.push((Instant::now(), frame));
        state.rx.extend(state.armed.drain(..));
        if let Some(responder) = state.responder.as_mut()
            && let Some(reply) = responder(&frame)
        {
            state.rx.push_back(reply);
        }
        Ok(())
    }

    fn receive_timeout(&mut self, _timeout: Duration) -> Result<AkFrame, CanError> {
        let mut state = self.state.lock();
        state.receive_calls += 1;
        state.rx.pop_front().ok_or(CanError::Timeout)
    }

    fn try_receive(&mut self) -> Result<Option<AkFrame>, CanError> {
        let mut state = self.state.lock();
        let frame = state.rx.pop_front();
        if frame.is_some() {
            state.drained += 1;
        }
        Ok(frame)
    }
}

impl MockHandle {
    /// 追加一帧回复，下一次发送后可被接收
    pub fn push_reply(&self, frame: AkFrame) {
        self.state.lock().armed.push_back(frame);
    }

    /// 追加一帧已到达接收队列的帧
    pub fn push_received(&self, frame: AkFrame) {
        self.state.lock().rx.push_back(frame);
    }

    /// 每次发送后调用，返回 `Some` 时将该帧加入接收队列
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&AkFrame) -> Option<AkFrame> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    /// 之后的发送全部返回 IO 错误
    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    pub fn sent_frames(&self) -> Vec<AkFrame> {
        self.state.lock().sent.iter().map(|(_, f)| *f).collect()
    }

    /// 每帧的发送时刻
    pub fn send_instants(&self) -> Vec<Instant> {
        self.state.lock().sent.iter().map(|(t, _)| *t).collect()
    }

    pub fn receive_calls(&self) -> usize {
        self.state.lock().receive_calls
    }

    /// 被非阻塞读取清掉的帧数
    pub fn drained_frames(&self) -> usize {
        self.state.lock().drained
    }

    pub fn pending_replies(&self) -> usize {
        let state = self.state.lock();
        state.armed.len() + state.rx.len()
    }

    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }
}
