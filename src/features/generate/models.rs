use serde::{Deserialize, Serialize};

/// 上传图片允许的媒体类型（与前端文件校验保持一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum ImageMediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageMediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Webp => "image/webp",
            ImageMediaType::Gif => "image/gif",
        }
    }
}

/// 用户上传的产品图片（payload 为 base64 文本，由前端压缩后上传）
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// base64 编码的图片数据（不带 data: 前缀）
    pub base64: String,
    /// 媒体类型
    pub media_type: ImageMediaType,
    /// 展示用文件名
    pub name: String,
}

/// 规格表单行
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

/// 销量/满意度等信任数据（可选，留空时提示模型自行补全）
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrustData {
    #[serde(default)]
    pub sales_count: String,
    #[serde(default)]
    pub satisfaction_rate: String,
    #[serde(default)]
    pub review_count: String,
    #[serde(default)]
    pub repurchase_rate: String,
}

impl TrustData {
    pub fn is_empty(&self) -> bool {
        self.sales_count.is_empty()
            && self.satisfaction_rate.is_empty()
            && self.review_count.is_empty()
            && self.repurchase_rate.is_empty()
    }
}

/// 配送/退换/AS 政策信息
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInfo {
    #[serde(default)]
    pub delivery: String,
    #[serde(default)]
    pub refund: String,
    #[serde(default, rename = "as")]
    pub after_service: String,
}

impl PolicyInfo {
    pub fn is_empty(&self) -> bool {
        self.delivery.is_empty() && self.refund.is_empty() && self.after_service.is_empty()
    }
}

/// 所有模板共用的产品基础信息
///
/// 不变量：셀링포인트与规格行保持提交顺序，渲染为有序列表（顺序具有语义）。
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInputBase {
    /// 产品名（唯一的必填字段）
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specifications: Vec<Specification>,
    #[serde(default)]
    pub target_audience: String,
    /// 핵심 셀링포인트（最多 5 条有意义，超出照常传给模型）
    #[serde(default)]
    pub key_selling_points: Vec<String>,
    #[serde(default)]
    pub uploaded_images: Vec<UploadedImage>,
    /// 痛点描述（可选扩展字段）
    #[serde(default)]
    pub problem_statement: String,
    /// Before/After 数据（可选扩展字段）
    #[serde(default)]
    pub before_after_data: String,
    #[serde(default)]
    pub trust_data: TrustData,
    #[serde(default)]
    pub policy_info: PolicyInfo,
}

/// 쿠팡风格专用字段
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoupangInput {
    #[serde(flatten)]
    pub base: ProductInputBase,
    #[serde(default)]
    pub original_price: String,
    #[serde(default)]
    pub discount_rate: String,
    #[serde(default)]
    pub final_price: String,
    #[serde(default)]
    pub delivery_info: String,
    #[serde(default)]
    pub rocket_badge: bool,
    #[serde(default)]
    pub certification_badges: Vec<String>,
    #[serde(default)]
    pub review_highlights: Vec<String>,
    /// 与竞品的对比表行（label/ours/theirs）
    #[serde(default)]
    pub comparison_items: Vec<ComparisonItem>,
    /// 紧迫感文案（留空时由模型生成）
    #[serde(default)]
    pub urgency_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub ours: String,
    #[serde(default)]
    pub theirs: String,
}

/// 스마트스토어风格专用字段
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartstoreInput {
    #[serde(flatten)]
    pub base: ProductInputBase,
    #[serde(default)]
    pub brand_story: String,
    #[serde(default)]
    pub product_origin: String,
    #[serde(default)]
    pub sourcing_story: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub qa_items: Vec<QaItem>,
    #[serde(default)]
    pub ingredient_details: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub naver_pay_badge: bool,
    /// 使用方法指南（可选扩展字段）
    #[serde(default)]
    pub usage_guide: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QaItem {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// 프리미엄风格专用字段
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PremiumInput {
    #[serde(flatten)]
    pub base: ProductInputBase,
    #[serde(default)]
    pub brand_heritage: String,
    #[serde(default)]
    pub materials_story: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub limited_edition_info: String,
    #[serde(default)]
    pub unboxing_description: String,
    #[serde(default)]
    pub endorsements: Vec<Endorsement>,
    #[serde(default)]
    pub videos: Vec<VideoRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Endorsement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub quote: String,
}

/// 视频不参与截图渲染，仅以占位注释形式写入 HTML。
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VideoRef {
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

/// 生成请求：模板标签决定字段 schema 与提示词档案，二者一经生成即绑定。
///
/// 闭合的 tagged union：新增第四种模板时由编译器强制补全所有 match 分支。
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "template", rename_all = "lowercase")]
pub enum TemplateInput {
    Coupang(CoupangInput),
    Smartstore(SmartstoreInput),
    Premium(PremiumInput),
}

impl TemplateInput {
    /// 共用基础信息
    pub fn base(&self) -> &ProductInputBase {
        match self {
            TemplateInput::Coupang(v) => &v.base,
            TemplateInput::Smartstore(v) => &v.base,
            TemplateInput::Premium(v) => &v.base,
        }
    }

    /// 模板标签名（日志/统计用）
    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateInput::Coupang(_) => "coupang",
            TemplateInput::Smartstore(_) => "smartstore",
            TemplateInput::Premium(_) => "premium",
        }
    }
}

/// `POST /generate` 成功响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// 页面 id（UUID v4）
    #[schema(example = "8b8f2f8a-1a2b-4c3d-9e0f-112233445566")]
    pub id: String,
    /// 前端预览路径
    #[schema(example = "/preview/8b8f2f8a-1a2b-4c3d-9e0f-112233445566")]
    pub preview_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_input_deserializes_by_tag() {
        let raw = serde_json::json!({
            "template": "coupang",
            "productName": "무선 청소기",
            "keySellingPoints": ["강력 흡입", "저소음"],
            "originalPrice": "299,000원",
            "rocketBadge": true,
        });
        let input: TemplateInput = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(input.template_name(), "coupang");
        assert_eq!(input.base().product_name, "무선 청소기");
        match input {
            TemplateInput::Coupang(c) => {
                assert!(c.rocket_badge);
                assert_eq!(c.original_price, "299,000원");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_template_tag_is_rejected() {
        let raw = serde_json::json!({ "template": "elevenst", "productName": "x" });
        assert!(serde_json::from_value::<TemplateInput>(raw).is_err());
    }

    #[test]
    fn media_type_roundtrips_wire_name() {
        let v: ImageMediaType = serde_json::from_str("\"image/webp\"").expect("parse");
        assert_eq!(v, ImageMediaType::Webp);
        assert_eq!(v.as_str(), "image/webp");
    }
}
