//! `chromiumoxide`-backed implementation of [`BrowserPage`].

use super::page::BrowserPage;
use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::Duration;

pub struct CdpPage(pub Page);

#[async_trait]
impl BrowserPage for CdpPage {
    async fn current_url(&self) -> anyhow::Result<Option<String>> {
        Ok(self.0.url().await.context("reading page url")?)
    }

    async fn goto(&self, url: &str) -> anyhow::Result<()> {
        self.0.goto(url).await.context("navigating")?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> anyhow::Result<()> {
        self.0
            .wait_for_navigation()
            .await
            .context("waiting for navigation")?;
        Ok(())
    }

    async fn wait_for_navigation_idle(&self) -> anyhow::Result<()> {
        // chromiumoxide has no dedicated network-idle primitive; the
        // orchestrator already races this against a 5s outer timeout, so a
        // best-effort navigation wait is sufficient here.
        let _ = self.0.wait_for_navigation().await;
        Ok(())
    }

    async fn content(&self) -> anyhow::Result<String> {
        Ok(self.0.content().await.context("reading page content")?)
    }

    async fn eval_bool(&self, script: &str) -> anyhow::Result<bool> {
        let result = self.0.evaluate(script).await.context("evaluating script")?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }

    async fn eval_string(&self, script: &str) -> anyhow::Result<Option<String>> {
        let result = self.0.evaluate(script).await.context("evaluating script")?;
        Ok(result.into_value::<Option<String>>().unwrap_or(None))
    }

    async fn click(&self, selector: &str) -> anyhow::Result<()> {
        let element = self
            .0
            .find_element(selector)
            .await
            .with_context(|| format!("locating element {selector}"))?;
        element
            .click()
            .await
            .with_context(|| format!("clicking element {selector}"))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str, delay: Duration) -> anyhow::Result<()> {
        let element = self
            .0
            .find_element(selector)
            .await
            .with_context(|| format!("locating element {selector}"))?;
        for ch in text.chars() {
            element
                .type_str(ch.to_string())
                .await
                .with_context(|| format!("typing into {selector}"))?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    async fn press_key_on(&self, selector: &str, key: &str) -> anyhow::Result<()> {
        let element = self
            .0
            .find_element(selector)
            .await
            .with_context(|| format!("locating element {selector}"))?;
        element
            .press_key(key)
            .await
            .with_context(|| format!("pressing {key} on {selector}"))?;
        Ok(())
    }

    async fn bring_to_front(&self) -> anyhow::Result<()> {
        let _ = self.0.bring_to_front().await;
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        // `Page::close` consumes its receiver; `Page` is a cheap Arc-backed
        // handle, so clone it rather than requiring `&mut self` up the stack.
        self.0.clone().close().await.context("closing page")?;
        Ok(())
    }
}
