use super::models::{
    CoupangInput, PremiumInput, ProductInputBase, SmartstoreInput, TemplateInput,
};

/// 提示词装配器
///
/// 纯函数：同一输入必须产出字节级一致的 (system, user) 提示词对，
/// 不引入时间戳/随机数，保证不调用模型也能独立测试提示词构造。
///
/// system prompt 负责：人设 + 八条硬性输出约束 + 模板风格指令（第 9 条）；
/// user prompt 负责：产品信息的确定性文本化 + 模板专属字段块 +
/// 必备 section 清单 + 图片占位符契约重申。

/// 共用前导：韩国电商详情页设计师人设与硬性输出规则。
const SYSTEM_BASE: &str = "당신은 한국 이커머스 상세페이지 전문 디자이너이자 카피라이터입니다.

반드시 지켜야 할 규칙:
1. 완전한 HTML 문서만 출력하세요 (<!DOCTYPE html>부터 </html>까지).
2. 마크다운, 설명 텍스트, 코드블록 없이 순수 HTML만 출력하세요.
3. 모든 CSS는 <style> 태그 안에 인라인으로 작성하세요. 외부 CSS 파일 링크 금지.
4. Google Fonts (Noto Sans KR)만 외부 링크로 허용합니다.
5. 첨부된 이미지들을 HTML <img> 태그로 배치할 때 src 값을 반드시 [IMAGE_1], [IMAGE_2], [IMAGE_3] 형태의 플레이스홀더로 작성하세요.
6. JavaScript는 <script> 태그 안에 인라인으로 작성하세요. 외부 JS 파일 링크 금지.
7. 모바일 우선 반응형 디자인 (최대 너비 600px 기준).
8. 세로로 긴 레이아웃 (총 콘텐츠 높이 최소 3000px 이상). 카피는 스펙 나열보다 고객이 얻는 효용을 강조하세요.";

/// 模板风格指令（system prompt 第 9 条），按模板标签查表。
fn style_directive(input: &TemplateInput) -> &'static str {
    match input {
        TemplateInput::Coupang(_) => {
            "\n9. 쿠팡 스타일 전문가입니다. 빨간색(#cc0000)과 흰색 중심, 굵은 가격 강조, 긴박감 요소, 로켓배송 뱃지가 특징입니다."
        }
        TemplateInput::Smartstore(_) => {
            "\n9. 네이버 스마트스토어 스타일 전문가입니다. 초록색(#03c75a)과 흰색 중심, 브랜드 스토리텔링, 신뢰 요소, 커뮤니티 감성이 특징입니다."
        }
        TemplateInput::Premium(_) => {
            "\n9. 프리미엄/럭셔리 브랜드 상세페이지 전문가입니다. 다크(#1a1a1a)와 골드(#b8960c) 중심, 미니멀 타이포그래피, 전폭 이미지, 희소성 강조가 특징입니다."
        }
    }
}

/// 构造 system prompt（确定性）。
pub fn build_system_prompt(input: &TemplateInput) -> String {
    let mut out = String::with_capacity(SYSTEM_BASE.len() + 160);
    out.push_str(SYSTEM_BASE);
    out.push_str(style_directive(input));
    out
}

/// 构造 user prompt（确定性），按模板分派。
pub fn build_user_prompt(input: &TemplateInput) -> String {
    match input {
        TemplateInput::Coupang(v) => build_coupang_prompt(v),
        TemplateInput::Smartstore(v) => build_smartstore_prompt(v),
        TemplateInput::Premium(v) => build_premium_prompt(v),
    }
}

/// 空字段的统一兜底文案：提示模型自行推断补全，而不是留白。
fn or_unfilled(value: &str) -> &str {
    if value.trim().is_empty() {
        "미입력 — 제품 정보에 맞게 적절히 추론해 작성"
    } else {
        value
    }
}

/// 有序列表渲染：셀링포인트等字段顺序具有语义，按提交顺序编号。
fn numbered_lines(items: &[String]) -> String {
    let lines: Vec<String> = items
        .iter()
        .filter(|p| !p.trim().is_empty())
        .enumerate()
        .map(|(i, p)| format!("  {}. {}", i + 1, p))
        .collect();
    if lines.is_empty() {
        "  없음".to_string()
    } else {
        lines.join("\n")
    }
}

fn joined_or(items: &[String], fallback: &str) -> String {
    let filtered: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if filtered.is_empty() {
        fallback.to_string()
    } else {
        filtered.join(", ")
    }
}

/// 所有模板共用的产品信息段。
fn build_base_section(base: &ProductInputBase) -> String {
    let specs_rows: String = {
        let rows: Vec<String> = base
            .specifications
            .iter()
            .filter(|s| !s.key.is_empty() && !s.value.is_empty())
            .map(|s| format!("  - {}: {}", s.key, s.value))
            .collect();
        if rows.is_empty() {
            "스펙 정보 없음".to_string()
        } else {
            rows.join("\n")
        }
    };

    let image_instructions = if base.uploaded_images.is_empty() {
        "이미지 없음".to_string()
    } else {
        base.uploaded_images
            .iter()
            .enumerate()
            .map(|(i, img)| format!("- [IMAGE_{}]: {}", i + 1, img.name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut out = format!(
        "다음 제품의 한국식 이커머스 상세페이지 HTML을 생성해주세요.

## 제품 기본 정보
- **제품명**: {product_name}
- **설명**: {description}
- **타겟 고객**: {target}
- **핵심 셀링포인트**:
{selling_points}

## 제품 스펙
{specs}",
        product_name = base.product_name,
        description = or_unfilled(&base.description),
        target = if base.target_audience.trim().is_empty() {
            "일반 소비자"
        } else {
            &base.target_audience
        },
        selling_points = numbered_lines(&base.key_selling_points),
        specs = specs_rows,
    );

    // 扩展字段只在有输入时追加对应块，空值连标题一起省略，避免 user prompt 虚长
    if !base.problem_statement.trim().is_empty() {
        out.push_str(&format!(
            "\n\n## 고객 페인포인트\n{}",
            base.problem_statement
        ));
    }
    if !base.before_after_data.trim().is_empty() {
        out.push_str(&format!(
            "\n\n## Before / After\n{}",
            base.before_after_data
        ));
    }
    if !base.trust_data.is_empty() {
        out.push_str(&format!(
            "\n\n## 신뢰 데이터
- 누적 판매: {sales}
- 만족도: {satisfaction}
- 리뷰 수: {reviews}
- 재구매율: {repurchase}",
            sales = or_unfilled(&base.trust_data.sales_count),
            satisfaction = or_unfilled(&base.trust_data.satisfaction_rate),
            reviews = or_unfilled(&base.trust_data.review_count),
            repurchase = or_unfilled(&base.trust_data.repurchase_rate),
        ));
    }
    if !base.policy_info.is_empty() {
        out.push_str(&format!(
            "\n\n## 배송/교환/AS 안내
- 배송: {delivery}
- 교환/환불: {refund}
- A/S: {after_service}",
            delivery = or_unfilled(&base.policy_info.delivery),
            refund = or_unfilled(&base.policy_info.refund),
            after_service = or_unfilled(&base.policy_info.after_service),
        ));
    }

    out.push_str(&format!(
        "\n\n## 이미지 플레이스홀더 (반드시 준수)
{image_instructions}
반드시 <img src=\"[IMAGE_1]\">, <img src=\"[IMAGE_2]\"> 형태로 사용하세요.",
    ));
    out
}

fn build_coupang_prompt(input: &CoupangInput) -> String {
    let base = build_base_section(&input.base);

    let review_lines: String = {
        let rows: Vec<String> = input
            .review_highlights
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| format!("- \"{}\"", r))
            .collect();
        if rows.is_empty() {
            "없음".to_string()
        } else {
            rows.join("\n")
        }
    };

    let comparison_lines: String = {
        let rows: Vec<String> = input
            .comparison_items
            .iter()
            .filter(|c| !c.label.trim().is_empty())
            .map(|c| {
                format!(
                    "- {}: 우리 제품 \"{}\" vs 타사 \"{}\"",
                    c.label,
                    or_unfilled(&c.ours),
                    or_unfilled(&c.theirs)
                )
            })
            .collect();
        if rows.is_empty() {
            "없음".to_string()
        } else {
            rows.join("\n")
        }
    };

    format!(
        "{base}

## 쿠팡 스타일 전용 정보
- **원가**: {original_price}
- **할인율**: {discount_rate}
- **판매가**: {final_price}
- **배송 정보**: {delivery}
- **로켓배송 뱃지**: {rocket}
- **인증 배지**: {badges}
- **긴박감 문구**: {urgency}

## 고객 리뷰 하이라이트
{reviews}

## 타사 비교
{comparison}

## 필수 포함 섹션 (쿠팡 스타일)

### 1. 히어로: 가격 강타 배너
- 빨간 배경(#cc0000)에 원가/할인율/판매가 크게 표시
- \"오늘만 특가\" + 카운트다운 타이머
- 로켓배송 뱃지 (입력된 경우)

### 2. 긴박감 / 재고 경고 배너
- \"⚡ 재고 N개 남음!\" + 프로그레스 바

### 3. 핵심 스펙 카드 (3~5개)
- 빨간 아이콘 + 텍스트

### 4. 인증 뱃지 섹션
- 배지 아이콘 + 인증명

### 5. 고객 리뷰 하이라이트
- 별점 5개 + 리뷰 텍스트 카드 (입력된 경우)

### 6. 제품 이미지 갤러리 (모든 [IMAGE_N] 사용)

### 7. 스펙 테이블

### 8. CTA 섹션
- 빨간 \"지금 구매하기\" + 회색 \"장바구니 담기\"

## 디자인 요구사항
- 색상: 빨강(#cc0000), 흰색, 노랑(#ffd600)
- Noto Sans KR 폰트 700/900 weight
- 카운트다운 타이머, 숫자 카운트업, 스크롤 페이드인 애니메이션",
        original_price = or_unfilled(&input.original_price),
        discount_rate = if input.discount_rate.trim().is_empty() {
            "미입력".to_string()
        } else {
            format!("{}%", input.discount_rate)
        },
        final_price = or_unfilled(&input.final_price),
        delivery = if input.delivery_info.trim().is_empty() {
            "로켓배송"
        } else {
            &input.delivery_info
        },
        rocket = if input.rocket_badge { "표시" } else { "미표시" },
        badges = joined_or(&input.certification_badges, "없음"),
        urgency = or_unfilled(&input.urgency_message),
        reviews = review_lines,
        comparison = comparison_lines,
    )
}

fn build_smartstore_prompt(input: &SmartstoreInput) -> String {
    let base = build_base_section(&input.base);

    let qa_text: String = {
        let items: Vec<String> = input
            .qa_items
            .iter()
            .filter(|q| !q.question.trim().is_empty())
            .map(|q| {
                format!(
                    "Q: {}\nA: {}",
                    q.question,
                    if q.answer.trim().is_empty() {
                        "답변 미입력"
                    } else {
                        &q.answer
                    }
                )
            })
            .collect();
        if items.is_empty() {
            "Q&A 없음".to_string()
        } else {
            items.join("\n\n")
        }
    };

    let hashtags: String = {
        let tags: Vec<&str> = input
            .hashtags
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if tags.is_empty() {
            "없음".to_string()
        } else {
            tags.join(" ")
        }
    };

    format!(
        "{base}

## 스마트스토어 전용 정보
- **브랜드 스토리**: {brand_story}
- **원산지/생산지**: {origin}
- **소싱 스토리**: {sourcing}
- **해시태그**: {hashtags}
- **성분/소재 상세**: {ingredients}
- **사용 방법**: {usage}
- **인증 정보**: {certifications}
- **네이버페이 뱃지**: {naver_pay}

## Q&A
{qa}

## 필수 포함 섹션 (스마트스토어 스타일)

### 1. 브랜드 스토리 히어로
- 감성적인 라이프스타일 이미지 ([IMAGE_1])
- 브랜드 스토리 인용 형식 표시

### 2. 원산지/소싱 스토리 섹션
- 지도 아이콘 + 원산지 설명
- 소싱 스토리 산문체

### 3. 핵심 특징 카드 (3~5개)
- 초록 테마 카드

### 4. 성분/소재 상세 섹션

### 5. 인증 뱃지 그리드

### 6. Q&A 아코디언
- 질문/답변 토글 (JavaScript)

### 7. 해시태그 클라우드

### 8. 이미지 갤러리 (모든 [IMAGE_N] 사용)

### 9. 스펙 테이블

### 10. 네이버페이 CTA
- 초록 \"네이버페이로 구매\" + \"찜하기\"

## 디자인 요구사항
- 색상: 초록(#03c75a), 흰색, 연회색(#f5f5f5)
- 라이프스타일 감성, 여백 넉넉히
- Noto Sans KR 폰트, 스크롤 페이드인 애니메이션",
        brand_story = or_unfilled(&input.brand_story),
        origin = or_unfilled(&input.product_origin),
        sourcing = or_unfilled(&input.sourcing_story),
        hashtags = hashtags,
        ingredients = or_unfilled(&input.ingredient_details),
        usage = or_unfilled(&input.usage_guide),
        certifications = joined_or(&input.certifications, "없음"),
        naver_pay = if input.naver_pay_badge {
            "표시"
        } else {
            "미표시"
        },
        qa = qa_text,
    )
}

fn build_premium_prompt(input: &PremiumInput) -> String {
    let base = build_base_section(&input.base);

    let endorsement_text: String = {
        let rows: Vec<String> = input
            .endorsements
            .iter()
            .filter(|e| !e.name.trim().is_empty())
            .map(|e| format!("- {} ({}): \"{}\"", e.name, e.platform, e.quote))
            .collect();
        if rows.is_empty() {
            "없음".to_string()
        } else {
            rows.join("\n")
        }
    };

    // 영상은 렌더링 엔진에서 재생할 수 없으므로 주석 플레이스홀더로 처리
    let video_text: String = if input.videos.is_empty() {
        "없음".to_string()
    } else {
        input
            .videos
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let caption = if v.caption.trim().is_empty() {
                    String::new()
                } else {
                    format!(" ({})", v.caption)
                };
                format!(
                    "- 영상 {n}: {url}{caption}\n  → HTML에 <!-- VIDEO_{n}_PLACEHOLDER: {url} --> 주석 삽입 + 검은 배경 재생버튼 UI 표시",
                    n = i + 1,
                    url = v.url,
                    caption = caption,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{base}

## 프리미엄 전용 정보
- **브랜드 헤리티지**: {heritage}
- **소재/장인정신 스토리**: {materials}
- **컬렉션명**: {collection}
- **한정판 정보**: {limited}
- **언박싱 경험**: {unboxing}

## 인플루언서/셀럽 추천
{endorsements}

## 영상 (렌더링 제외 → 플레이스홀더 처리)
{videos}

## 필수 포함 섹션 (프리미엄 스타일)

### 1. 풀스크린 히어로
- 다크 배경에 골드 텍스트
- 컬렉션명 + 브랜드명 + 한 줄 철학 문구
- [IMAGE_1] 전폭 배치

### 2. 브랜드 헤리티지 섹션
- 타임라인 형식 또는 산문 + 이미지 교차 배치

### 3. 소재/장인정신 섹션
- 클로즈업 이미지 ([IMAGE_2]) + 소재 스토리

### 4. 한정판 배너 (입력된 경우)
- \"Limited Edition\" 골드 뱃지

### 5. 언박싱 경험 섹션
- 패키지 이미지 + 설명 문구

### 6. 영상 플레이스홀더 섹션 (영상 입력된 경우)
- <!-- VIDEO_N_PLACEHOLDER: url --> 주석 삽입
- 검은 배경 + 재생 아이콘 UI 렌더링

### 7. 인플루언서 추천 갤러리
- 다크 카드에 인용 + 이름 + 플랫폼

### 8. 이미지 갤러리 ([IMAGE_N] 모두 사용)

### 9. 스펙 테이블 (다크 테마)

### 10. CTA
- 골드 \"지금 주문하기\" + \"컬렉션 보기\"

## 디자인 요구사항
- 색상: 다크(#1a1a1a), 골드(#b8960c), 흰색
- 미니멀 타이포그래피, 풍부한 여백
- 느린 페이드인 애니메이션, 고급스러운 hover 효과
- Noto Sans KR 폰트 (400, 700, 900 weight)",
        heritage = or_unfilled(&input.brand_heritage),
        materials = or_unfilled(&input.materials_story),
        collection = or_unfilled(&input.collection_name),
        limited = if input.limited_edition_info.trim().is_empty() {
            "해당 없음"
        } else {
            &input.limited_edition_info
        },
        unboxing = or_unfilled(&input.unboxing_description),
        endorsements = endorsement_text,
        videos = video_text,
    )
}
