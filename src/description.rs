//! 仓库描述文档
//!
//! 发现文档的内存表示与校验。文档整体校验：任何一个服务条目非法都会
//! 使整个解析失败，不返回半成品描述（残缺目录不能用于分发决策）。

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{RepoError, Result};

/// 服务描述符：发现文档中的一个服务条目
///
/// 解析完成后不再修改。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceDescriptor {
    /// 服务名（大小写不敏感的标识符，非空）
    pub name: String,

    /// 端点 URL（至少一个；相对地址已在解析时合并到仓库根）
    pub urls: Vec<Url>,

    /// 协议/版本等元数据，保持文档原样
    pub metadata: Value,
}

impl ServiceDescriptor {
    /// 首个端点 URL
    pub fn url(&self) -> &Url {
        &self.urls[0]
    }

    /// 大小写不敏感的名称匹配
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// 版本元数据（如果有）
    pub fn version(&self) -> Option<&str> {
        self.metadata.get("version").and_then(Value::as_str)
    }
}

/// 仓库描述：一次发现调用的完整解析结果
///
/// 每次发现调用都重新构建，不跨调用缓存；由调用方独占持有。
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDescription {
    /// 仓库根 URL（绝对）
    pub root_url: Url,

    /// 服务条目，保持文档顺序
    pub services: Vec<ServiceDescriptor>,
}

impl RepositoryDescription {
    /// 从解析后的 JSON 文档构建仓库描述
    ///
    /// 顶层必须是包含 `services` 数组的对象；每个条目必须带非空
    /// 字符串 `name` 和 `url`（字符串）或 `urls`（非空字符串数组）。
    /// 相对 URL 合并到 `root_url`。
    pub fn from_document(document: &Value, root_url: &Url) -> Result<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| RepoError::parse("Document root is not an object"))?;
        let entries = object
            .get("services")
            .ok_or_else(|| RepoError::parse("Document has no 'services' field"))?
            .as_array()
            .ok_or_else(|| RepoError::parse("'services' is not an array"))?;

        let mut services = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            services.push(parse_entry(entry, index, root_url)?);
        }

        Ok(Self {
            root_url: root_url.clone(),
            services,
        })
    }

    /// 大小写不敏感的线性查找，返回首个匹配
    pub fn find_service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.matches_name(name))
    }
}

fn parse_entry(entry: &Value, index: usize, root_url: &Url) -> Result<ServiceDescriptor> {
    let object = entry
        .as_object()
        .ok_or_else(|| RepoError::parse(format!("Service entry {} is not an object", index)))?;

    let name = object
        .get("name")
        .ok_or_else(|| RepoError::parse(format!("Service entry {} has no 'name'", index)))?
        .as_str()
        .ok_or_else(|| RepoError::parse(format!("Service entry {} 'name' is not a string", index)))?;
    if name.is_empty() {
        return Err(RepoError::parse(format!("Service entry {} has an empty name", index)));
    }

    // url: string 或 urls: [string, ...]
    let raw_urls: Vec<&str> = if let Some(url_value) = object.get("url") {
        let url = url_value
            .as_str()
            .ok_or_else(|| RepoError::parse(format!("Service '{}' 'url' is not a string", name)))?;
        vec![url]
    } else if let Some(urls_value) = object.get("urls") {
        let array = urls_value
            .as_array()
            .ok_or_else(|| RepoError::parse(format!("Service '{}' 'urls' is not an array", name)))?;
        if array.is_empty() {
            return Err(RepoError::parse(format!("Service '{}' has an empty 'urls' array", name)));
        }
        array
            .iter()
            .map(|value| {
                value.as_str().ok_or_else(|| {
                    RepoError::parse(format!("Service '{}' has a non-string entry in 'urls'", name))
                })
            })
            .collect::<Result<Vec<&str>>>()?
    } else {
        return Err(RepoError::parse(format!("Service '{}' has no 'url' or 'urls'", name)));
    };

    let mut urls = Vec::with_capacity(raw_urls.len());
    for raw in raw_urls {
        let resolved = root_url.join(raw).map_err(|e| {
            RepoError::parse(format!("Service '{}' has an unresolvable url '{}': {}", name, raw, e))
        })?;
        urls.push(resolved);
    }

    Ok(ServiceDescriptor {
        name: name.to_string(),
        urls,
        metadata: entry.clone(),
    })
}
