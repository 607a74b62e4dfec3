use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::AppError;

/// 把一段完整 HTML 渲染为整页 PNG。
///
/// 每次调用独占一个浏览器实例：按移动端视口加载 → 等待渲染稳定 →
/// 量取实际文档高度 → 把视口扩到全文档高度 → 整页截图。无论截图
/// 成败，浏览器实例都会被回收，失败只影响本次请求。
pub async fn capture_full_page(html: &str, cfg: &ExportConfig) -> Result<Vec<u8>, AppError> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-setuid-sandbox")
        .window_size(cfg.viewport_width, cfg.initial_height);
    if let Some(path) = &cfg.chrome_path {
        builder = builder.chrome_executable(path);
    }
    let browser_config = builder
        .build()
        .map_err(|e| AppError::Resource(format!("浏览器配置无效: {e}")))?;

    let (mut browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| AppError::Resource(format!("浏览器启动失败: {e}")))?;

    // CDP 事件循环必须持续被驱动，否则所有命令都会挂起
    let driver = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = render_and_screenshot(&browser, html, cfg).await;

    if let Err(e) = browser.close().await {
        warn!("关闭浏览器失败: {}", e);
    }
    if let Err(e) = browser.wait().await {
        debug!("等待浏览器退出失败: {}", e);
    }
    driver.abort();

    result
}

async fn render_and_screenshot(
    browser: &Browser,
    html: &str,
    cfg: &ExportConfig,
) -> Result<Vec<u8>, AppError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::Resource(format!("页面创建失败: {e}")))?;

    page.set_content(html)
        .await
        .map_err(|e| AppError::Resource(format!("页面加载失败: {e}")))?;
    apply_viewport(&page, cfg, i64::from(cfg.initial_height)).await?;

    // 外链字体/CSS 动画需要一点时间才能落定，过早量高会截出空白尾部
    tokio::time::sleep(cfg.settle_delay()).await;

    let full_height: i64 = page
        .evaluate("document.documentElement.scrollHeight")
        .await
        .map_err(|e| AppError::Resource(format!("文档高度测量失败: {e}")))?
        .into_value()
        .map_err(|e| AppError::Resource(format!("文档高度解析失败: {e}")))?;
    debug!(height = full_height, "文档高度测量完成");

    apply_viewport(&page, cfg, full_height).await?;

    let png = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build(),
        )
        .await
        .map_err(|e| AppError::Resource(format!("截图失败: {e}")))?;

    Ok(png)
}

async fn apply_viewport(page: &Page, cfg: &ExportConfig, height: i64) -> Result<(), AppError> {
    let params = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(cfg.viewport_width))
        .height(height)
        .device_scale_factor(cfg.device_scale_factor)
        .mobile(false)
        .build()
        .map_err(|e| AppError::Resource(format!("视口参数无效: {e}")))?;
    page.execute(params)
        .await
        .map_err(|e| AppError::Resource(format!("视口设置失败: {e}")))?;
    Ok(())
}
