//! 形变引擎配置
//!
//! 参数扁平化，默认值直接写在 `Default` 中。

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    // ========== 校验 ==========
    /// 蒙皮权重和允许偏离 1.0 的误差，默认 1e-3
    pub skin_weight_tolerance: f32,

    // ========== 数值 ==========
    /// 行列式绝对值不超过此值视为奇异矩阵，默认 f32::EPSILON
    pub degenerate_epsilon: f32,

    // ========== 性能 ==========
    /// 顶点数达到该值时 CPU 蒙皮改用 rayon 并行，默认 4096
    pub parallel_skinning_threshold: usize,

    // ========== 调试 ==========
    /// 是否输出逐帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // 导入层负责归一化，这里只做容差检查
            skin_weight_tolerance: 1e-3,

            degenerate_epsilon: f32::EPSILON,

            parallel_skinning_threshold: 4096,

            debug_log: false,
        }
    }
}

/// 全局配置实例
static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> =
    Lazy::new(|| RwLock::new(EngineConfig::default()));

/// 获取当前配置（只读副本）
pub fn get_config() -> EngineConfig {
    ENGINE_CONFIG.read().clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: EngineConfig) {
    *ENGINE_CONFIG.write() = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *ENGINE_CONFIG.write() = EngineConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.skin_weight_tolerance, 1e-3);
        assert_eq!(config.degenerate_epsilon, f32::EPSILON);
        assert!(!config.debug_log);
    }

    #[test]
    fn test_set_and_reset() {
        set_config(EngineConfig {
            debug_log: true,
            ..EngineConfig::default()
        });
        assert!(get_config().debug_log);
        reset_config();
        assert_eq!(get_config(), EngineConfig::default());
    }
}
