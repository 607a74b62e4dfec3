use super::models::UploadedImage;

/// 图片占位符编解码
///
/// 约定：提示词要求模型在 `<img>` 的 src 中只写字面量 `[IMAGE_n]`（1 起始），
/// 不写真实 URL。模型返回后在这里把每个占位符整体替换为
/// `data:<mediaType>;base64,<payload>`，最终文档不依赖任何外部图片请求。
///
/// 边界行为：
/// - 同一占位符出现多次时全部替换为同一数据；
/// - 超出提供图片数量的 `[IMAGE_k]` 原样保留（不静默删除，留给预览暴露问题）；
/// - 精确区分大小写，`[image_1]` 不会被替换。
pub fn placeholder_token(index_one_based: usize) -> String {
    format!("[IMAGE_{}]", index_one_based)
}

/// 把 `[IMAGE_n]` 全量替换为内联 data URL。
pub fn substitute_placeholders(html: &str, images: &[UploadedImage]) -> String {
    let mut out = html.to_string();
    for (i, img) in images.iter().enumerate() {
        let token = placeholder_token(i + 1);
        let data_url = format!("data:{};base64,{}", img.media_type.as_str(), img.base64);
        out = out.replace(&token, &data_url);
    }
    out
}
