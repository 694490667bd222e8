//! 命令定义和实现

pub mod encode;
pub mod motor;
pub mod r#move;
pub mod profiles;

pub use encode::EncodeCommand;
pub use r#move::MoveCommand;

use ak_driver::MotorStatus;

/// 打印一行状态
pub fn print_status(status: &MotorStatus) {
    println!(
        "position {:.4} rad ({:.2} deg)  velocity {:.4} rad/s  current {:.3} A",
        status.position_rad,
        status.position_deg(),
        status.velocity_rad_s,
        status.current_amp
    );
}
