//! 几何消息类型
//!
//! 字段与导航栈的几何消息逐一对应（位置、四元数姿态、速度向量），
//! 便于与机器人端的运动/导航子系统直接交换。

/// 三维向量（线速度、角速度等）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 三维坐标点（米）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 四元数姿态 (x, y, z, w)
///
/// `Default` 为全零（与导航栈的默认消息一致，**不是**单位四元数）。
/// 构造目标位姿时通常需要显式使用 [`Quaternion::IDENTITY`]。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// 单位四元数（无旋转）
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// 由平面偏航角（弧度）构造四元数
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw * 0.5;
        Self {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        }
    }

    /// 提取平面偏航角（弧度）
    pub fn yaw(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }
}

/// 位姿：位置 + 姿态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    /// 平面目标位姿：(x, y) + 偏航角
    ///
    /// ```rust
    /// use fleet_msgs::Pose;
    ///
    /// let pose = Pose::planar(3.0, 7.0, 0.0);
    /// assert_eq!(pose.position.x, 3.0);
    /// assert_eq!(pose.orientation.w, 1.0);
    /// ```
    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            position: Point::new(x, y, 0.0),
            orientation: Quaternion::from_yaw(yaw),
        }
    }
}

/// 速度指令：线速度 + 角速度
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl Twist {
    /// 平面底盘速度指令（前进速度 m/s，转向角速度 rad/s）
    pub const fn planar(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear: Vector3::new(linear_x, 0.0, 0.0),
            angular: Vector3::new(0.0, 0.0, angular_z),
        }
    }

    /// 停止指令（全零）
    pub const fn stop() -> Self {
        Self {
            linear: Vector3::ZERO,
            angular: Vector3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quaternion_default_is_zero() {
        let q = Quaternion::default();
        assert_eq!(q.w, 0.0);
        assert_ne!(q, Quaternion::IDENTITY);
    }

    #[test]
    fn test_yaw_conversion() {
        let q = Quaternion::from_yaw(std::f64::consts::FRAC_PI_2);
        assert!((q.yaw() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let q = Quaternion::from_yaw(0.0);
        assert_eq!(q, Quaternion::IDENTITY);
    }

    #[test]
    fn test_planar_twist() {
        let twist = Twist::planar(0.5, -0.2);
        assert_eq!(twist.linear.x, 0.5);
        assert_eq!(twist.angular.z, -0.2);
        assert_eq!(Twist::stop(), Twist::default());
    }
}
