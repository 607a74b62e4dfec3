/// 详情页生成（提示词组装 + 模型调用 + 发布）
pub mod generate;

/// 健康检查
pub mod health;

/// 生图平台适配（나노바나나 / Replicate / gpt-image-1）
pub mod imagegen;

/// 已发布页面的读取
pub mod page;

/// 整页 PNG 导出
pub mod export;
