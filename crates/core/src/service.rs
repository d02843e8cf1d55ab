//! Request orchestration for the keeper.
//!
//! [`KeeperService`] validates incoming requests, sanitises names, calls the [`Store`] and
//! shapes the composite views. Successful content-version mutations are reported to the
//! configured [`ChangeNotifier`] after the store call returns.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use keeper_types::{EntryName, NonEmptyText};
use url::Url;

use crate::constants::{
    CALLBACK_SCHEMES, DEFAULT_ALIAS_LIMIT, DEFAULT_ALIAS_OFFSET, ROOT_FOLDER_ID, ROOT_FOLDER_NAME,
};
use crate::dto::{
    require_fields, AliasesQuery, AliasesRequest, ContentsQuery, CreateAliasRequest,
    CreateFileContentRequest, CreateFileRequest, CreateFolderRequest, CreateListenerRequest,
    EditAliasRequest, EditFileContentRequest, EditFileRequest, EditFolderRequest,
    EditListenerRequest, FolderQuery,
};
use crate::models::{
    Alias, ContentFormat, File, FileContent, FileView, FileWithAliases, Folder, FolderView,
    FolderWithPath, Listener,
};
use crate::notifier::ChangeNotifier;
use crate::store::{AliasFilter, AliasOrder, FolderOrder, Store};
use crate::{KeeperError, KeeperResult};

/// Pure keeper data operations - no API concerns.
#[derive(Clone)]
pub struct KeeperService {
    store: Store,
    notifier: Arc<dyn ChangeNotifier>,
}

impl KeeperService {
    /// Creates a new `KeeperService`.
    ///
    /// # Arguments
    ///
    /// * `store` - Connected store with the schema in place.
    /// * `notifier` - Receives the file id after every content-version change.
    pub fn new(store: Store, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { store, notifier }
    }

    // Folders

    #[tracing::instrument(skip(self, req), fields(name = ?req.name))]
    pub async fn create_folder(&self, req: CreateFolderRequest) -> KeeperResult<Folder> {
        require_fields(&[("name", req.name.as_deref())])?;
        let name = EntryName::new(req.name.as_deref().unwrap_or_default())?;
        let parent_id = folder_ref(req.parent_id.as_deref());

        let folder = self.store.create_folder(&name, parent_id).await?;
        tracing::info!(folder_id = %folder.id, "folder created");
        Ok(folder)
    }

    /// Fetch a folder with its child folders and files.
    ///
    /// The id `root` returns the virtual root folder listing the top-level entries.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_folder(&self, folder_id: &str, query: &FolderQuery) -> KeeperResult<FolderView> {
        let order =
            FolderOrder::from_query(query.order_column.as_deref(), query.order_type.as_deref())?;

        let (folder, parent_id) = if folder_id == ROOT_FOLDER_ID {
            (root_folder(), None)
        } else {
            (self.store.get_folder(folder_id).await?, Some(folder_id))
        };

        let folders = self.store.list_folders(parent_id, order).await?;
        let files = self.store.list_files(parent_id, order).await?;
        let files = self.attach_file_aliases(files).await?;

        Ok(FolderView {
            folder,
            folders,
            files,
        })
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn edit_folder(&self, folder_id: &str, req: EditFolderRequest) -> KeeperResult<Folder> {
        reject_root(folder_id)?;
        require_fields(&[("name", req.name.as_deref())])?;
        let name = EntryName::new(req.name.as_deref().unwrap_or_default())?;
        self.store.rename_folder(folder_id, &name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_folder(&self, folder_id: &str) -> KeeperResult<bool> {
        reject_root(folder_id)?;
        let removed = self.store.delete_folder(folder_id).await?;
        if removed {
            tracing::info!("folder deleted");
        }
        Ok(removed)
    }

    // Files

    #[tracing::instrument(skip(self, req), fields(name = ?req.name))]
    pub async fn create_file(&self, req: CreateFileRequest) -> KeeperResult<File> {
        require_fields(&[("name", req.name.as_deref())])?;
        let name = EntryName::new(req.name.as_deref().unwrap_or_default())?;
        let folder_id = folder_ref(req.folder_id.as_deref());

        let file = self.store.create_file(&name, folder_id).await?;
        tracing::info!(file_id = %file.id, "file created");
        Ok(file)
    }

    /// Fetch a file with all of its content versions and aliases.
    #[tracing::instrument(skip(self))]
    pub async fn get_file(&self, file_id: &str) -> KeeperResult<FileView> {
        let file = self.store.get_file(file_id).await?;
        let contents = self.store.list_contents(file_id, None).await?;
        let aliases = self.store.list_file_aliases(file_id).await?;
        Ok(FileView {
            file,
            contents,
            aliases,
        })
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn edit_file(&self, file_id: &str, req: EditFileRequest) -> KeeperResult<File> {
        require_fields(&[("name", req.name.as_deref())])?;
        let name = EntryName::new(req.name.as_deref().unwrap_or_default())?;
        self.store.rename_file(file_id, &name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> KeeperResult<bool> {
        self.store.delete_file(file_id).await
    }

    // Content versions

    /// Add a content version to a file and notify its listeners.
    #[tracing::instrument(skip(self, req), fields(version = ?req.version))]
    pub async fn create_file_content(
        &self,
        file_id: &str,
        req: CreateFileContentRequest,
    ) -> KeeperResult<FileContent> {
        require_fields(&[
            ("version", req.version.as_deref()),
            ("content", req.content.as_deref()),
        ])?;
        let version = NonEmptyText::new(req.version.as_deref().unwrap_or_default())?;
        let format_id = req.format_id.as_deref().filter(|f| !f.trim().is_empty());

        let content = self
            .store
            .create_content(
                file_id,
                version.as_str(),
                req.content.as_deref().unwrap_or_default(),
                format_id,
            )
            .await?;

        self.notifier.notify(&content.file_id);
        Ok(content)
    }

    #[tracing::instrument(skip(self, query))]
    pub async fn get_file_contents(
        &self,
        file_id: &str,
        query: &ContentsQuery,
    ) -> KeeperResult<Vec<FileContent>> {
        if !self.store.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }
        let version = query.version.as_deref().filter(|v| !v.trim().is_empty());
        self.store.list_contents(file_id, version).await
    }

    /// Edit a content version and notify the listeners of the owning file.
    #[tracing::instrument(skip(self, req))]
    pub async fn edit_file_content(
        &self,
        content_id: &str,
        req: EditFileContentRequest,
    ) -> KeeperResult<FileContent> {
        let version = req
            .version
            .as_deref()
            .map(NonEmptyText::new)
            .transpose()?;

        let content = self
            .store
            .edit_content(
                content_id,
                version.as_ref().map(NonEmptyText::as_str),
                req.content.as_deref(),
            )
            .await?;

        self.notifier.notify(&content.file_id);
        Ok(content)
    }

    /// Delete a content version. Listeners are notified only when a row was removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_file_content(&self, content_id: &str) -> KeeperResult<bool> {
        match self.store.delete_content(content_id).await? {
            Some(file_id) => {
                self.notifier.notify(&file_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Listeners

    #[tracing::instrument(skip(self, req), fields(name = ?req.name))]
    pub async fn create_listener(
        &self,
        file_id: &str,
        req: CreateListenerRequest,
    ) -> KeeperResult<Listener> {
        require_fields(&[
            ("name", req.name.as_deref()),
            ("callback_endpoint", req.callback_endpoint.as_deref()),
        ])?;
        let name = NonEmptyText::new(req.name.as_deref().unwrap_or_default())?;
        let endpoint = validate_endpoint(req.callback_endpoint.as_deref().unwrap_or_default())?;

        let listener = self
            .store
            .create_listener(file_id, name.as_str(), &endpoint)
            .await?;
        tracing::info!(listener_id = %listener.id, "listener registered");
        Ok(listener)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_listener(&self, listener_id: &str) -> KeeperResult<Listener> {
        self.store.get_listener(listener_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_file_listeners(&self, file_id: &str) -> KeeperResult<Vec<Listener>> {
        if !self.store.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }
        self.store.list_listeners(file_id).await
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn edit_listener(
        &self,
        listener_id: &str,
        req: EditListenerRequest,
    ) -> KeeperResult<Listener> {
        let name = req.name.as_deref().map(NonEmptyText::new).transpose()?;
        let endpoint = req
            .callback_endpoint
            .as_deref()
            .map(validate_endpoint)
            .transpose()?;

        self.store
            .edit_listener(
                listener_id,
                name.as_ref().map(NonEmptyText::as_str),
                endpoint.as_deref(),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_listener(&self, listener_id: &str) -> KeeperResult<bool> {
        self.store.delete_listener(listener_id).await
    }

    // Aliases

    #[tracing::instrument(skip(self, req))]
    pub async fn create_alias(&self, req: CreateAliasRequest) -> KeeperResult<Alias> {
        require_fields(&[
            ("key", req.key.as_deref()),
            ("value", req.value.as_deref()),
            ("color", req.color.as_deref()),
        ])?;
        self.store
            .create_alias(
                req.key.as_deref().unwrap_or_default().trim(),
                req.value.as_deref().unwrap_or_default().trim(),
                req.color.as_deref().unwrap_or_default().trim(),
            )
            .await
    }

    #[tracing::instrument(skip(self, query))]
    pub async fn get_aliases(&self, query: &AliasesQuery) -> KeeperResult<Vec<Alias>> {
        let filter = AliasFilter {
            key: non_blank(query.key.as_deref()),
            value: non_blank(query.value.as_deref()),
            limit: parse_paging("limit", query.limit.as_deref(), DEFAULT_ALIAS_LIMIT)?,
            offset: parse_paging("offset", query.offset.as_deref(), DEFAULT_ALIAS_OFFSET)?,
            order: AliasOrder::from_query(query.order_by.as_deref(), query.order_type.as_deref())?,
        };
        self.store.list_aliases(&filter).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_alias(&self, alias_id: &str) -> KeeperResult<Alias> {
        self.store.get_alias(alias_id).await
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn edit_alias(&self, alias_id: &str, req: EditAliasRequest) -> KeeperResult<Alias> {
        self.store
            .edit_alias(
                alias_id,
                non_blank(req.key.as_deref()).as_deref(),
                non_blank(req.value.as_deref()).as_deref(),
                non_blank(req.color.as_deref()).as_deref(),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_alias(&self, alias_id: &str) -> KeeperResult<bool> {
        self.store.delete_alias(alias_id).await
    }

    /// Attach aliases to a file. Returns the number of new links.
    #[tracing::instrument(skip(self, req), fields(count = req.aliases.len()))]
    pub async fn add_aliases_to_file(&self, file_id: &str, req: AliasesRequest) -> KeeperResult<u64> {
        if req.aliases.is_empty() {
            return Err(KeeperError::RequiredField(vec!["aliases".into()]));
        }
        self.store.attach_aliases(file_id, &req.aliases).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_file_aliases(&self, file_id: &str) -> KeeperResult<Vec<Alias>> {
        if !self.store.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }
        self.store.list_file_aliases(file_id).await
    }

    /// Detach aliases from a file. Returns the number of links removed.
    #[tracing::instrument(skip(self, req), fields(count = req.aliases.len()))]
    pub async fn remove_file_aliases(
        &self,
        file_id: &str,
        req: AliasesRequest,
    ) -> KeeperResult<u64> {
        if req.aliases.is_empty() {
            return Err(KeeperError::RequiredField(vec!["aliases".into()]));
        }
        self.store.detach_aliases(file_id, &req.aliases).await
    }

    // Content formats

    #[tracing::instrument(skip(self))]
    pub async fn content_formats(&self) -> KeeperResult<Vec<ContentFormat>> {
        self.store.list_content_formats().await
    }

    async fn attach_file_aliases(&self, files: Vec<File>) -> KeeperResult<Vec<FileWithAliases>> {
        let ids: Vec<String> = files.iter().map(|f| f.id.clone()).collect();
        let mut by_file: HashMap<String, Vec<Alias>> = HashMap::new();
        for tagged in self.store.list_files_aliases(&ids).await? {
            by_file.entry(tagged.file_id).or_default().push(tagged.alias);
        }

        Ok(files
            .into_iter()
            .map(|file| {
                let aliases = by_file.remove(&file.id).unwrap_or_default();
                FileWithAliases { file, aliases }
            })
            .collect())
    }
}

fn root_folder() -> FolderWithPath {
    let epoch = DateTime::<Utc>::default();
    FolderWithPath {
        id: ROOT_FOLDER_ID.to_owned(),
        name: ROOT_FOLDER_NAME.to_owned(),
        parent_id: None,
        path: ROOT_FOLDER_NAME.to_owned(),
        created_at: epoch,
        updated_at: epoch,
    }
}

/// Map a client-supplied folder reference to a stored parent id. Blank values and `root`
/// both mean the virtual root folder.
fn folder_ref(folder_id: Option<&str>) -> Option<&str> {
    folder_id
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != ROOT_FOLDER_ID)
}

fn reject_root(folder_id: &str) -> KeeperResult<()> {
    if folder_id == ROOT_FOLDER_ID {
        return Err(KeeperError::NotValid("the root folder cannot be modified".into()));
    }
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> KeeperResult<String> {
    let endpoint = endpoint.trim();
    let url = Url::parse(endpoint).map_err(|err| {
        KeeperError::NotValid(format!("callback_endpoint {endpoint} is not a url: {err}"))
    })?;
    if !CALLBACK_SCHEMES.contains(&url.scheme()) {
        return Err(KeeperError::NotValid(format!(
            "callback_endpoint must be an http(s) url, got scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(KeeperError::NotValid(format!(
            "callback_endpoint {endpoint} has no host"
        )));
    }
    Ok(url.into())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn parse_paging(name: &str, value: Option<&str>, default: i64) -> KeeperResult<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(parsed) if parsed >= 0 => Ok(parsed),
            _ => Err(KeeperError::NotValid(format!(
                "{name} must be a non-negative integer, got {raw}"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::store::memory_store;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl ChangeNotifier for RecordingNotifier {
        fn notify(&self, file_id: &str) {
            self.seen.lock().unwrap().push(file_id.to_owned());
        }
    }

    async fn service() -> (KeeperService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = KeeperService::new(memory_store().await, notifier.clone());
        (service, notifier)
    }

    async fn file(service: &KeeperService, name: &str) -> File {
        service
            .create_file(CreateFileRequest {
                name: Some(name.into()),
                folder_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_folder_sanitises_name() {
        let (service, _) = service().await;
        let folder = service
            .create_folder(CreateFolderRequest {
                name: Some(" my/'app' ".into()),
                parent_id: Some("root".into()),
            })
            .await
            .unwrap();
        assert_eq!(folder.name, "myapp");
        assert!(folder.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_create_folder_validation() {
        let (service, _) = service().await;
        let err = service
            .create_folder(CreateFolderRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::RequiredField(_)));

        let err = service
            .create_folder(CreateFolderRequest {
                name: Some("//".into()),
                parent_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));
    }

    #[tokio::test]
    async fn test_root_folder_lists_top_level_with_aliases() {
        let (service, _) = service().await;
        service
            .create_folder(CreateFolderRequest {
                name: Some("apps".into()),
                parent_id: None,
            })
            .await
            .unwrap();
        let f = file(&service, "global.env").await;
        let alias = service
            .create_alias(CreateAliasRequest {
                key: Some("env".into()),
                value: Some("prod".into()),
                color: Some("#f00".into()),
            })
            .await
            .unwrap();
        service
            .add_aliases_to_file(
                &f.id,
                AliasesRequest {
                    aliases: vec![alias.id.clone()],
                },
            )
            .await
            .unwrap();

        let view = service
            .get_folder("root", &FolderQuery::default())
            .await
            .unwrap();
        assert_eq!(view.folder.path, "root");
        assert_eq!(view.folders.len(), 1);
        assert_eq!(view.files.len(), 1);
        assert_eq!(view.files[0].aliases, vec![alias]);
    }

    #[tokio::test]
    async fn test_root_folder_cannot_be_edited_or_deleted() {
        let (service, _) = service().await;
        assert!(service.delete_folder("root").await.is_err());
        let err = service
            .edit_folder(
                "root",
                EditFolderRequest {
                    name: Some("x".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));
    }

    #[tokio::test]
    async fn test_get_folder_rejects_unknown_order_column() {
        let (service, _) = service().await;
        let err = service
            .get_folder(
                "root",
                &FolderQuery {
                    order_column: Some("password".into()),
                    order_type: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));
    }

    #[tokio::test]
    async fn test_content_mutations_notify() {
        let (service, notifier) = service().await;
        let f = file(&service, "app.json").await;

        let content = service
            .create_file_content(
                &f.id,
                CreateFileContentRequest {
                    version: Some("v1".into()),
                    content: Some("{}".into()),
                    format_id: None,
                },
            )
            .await
            .unwrap();
        service
            .edit_file_content(
                &content.id,
                EditFileContentRequest {
                    version: None,
                    content: Some("{\"a\":1}".into()),
                },
            )
            .await
            .unwrap();
        assert!(service.delete_file_content(&content.id).await.unwrap());

        assert_eq!(notifier.seen(), vec![f.id.clone(), f.id.clone(), f.id.clone()]);
    }

    #[tokio::test]
    async fn test_failed_content_mutations_do_not_notify() {
        let (service, notifier) = service().await;
        let f = file(&service, "app.json").await;

        let err = service
            .create_file_content(
                &f.id,
                CreateFileContentRequest {
                    version: None,
                    content: Some("{}".into()),
                    format_id: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.missing_fields().unwrap(), ["version".to_string()]);

        assert!(service
            .edit_file_content("missing", EditFileContentRequest {
                version: Some("v2".into()),
                content: None,
            })
            .await
            .is_err());
        assert!(!service.delete_file_content("missing").await.unwrap());

        assert!(notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn test_get_file_includes_contents_and_aliases() {
        let (service, _) = service().await;
        let f = file(&service, "app.json").await;
        for version in ["v1", "v2"] {
            service
                .create_file_content(
                    &f.id,
                    CreateFileContentRequest {
                        version: Some(version.into()),
                        content: Some("x".into()),
                        format_id: None,
                    },
                )
                .await
                .unwrap();
        }

        let view = service.get_file(&f.id).await.unwrap();
        assert_eq!(view.contents.len(), 2);
        assert!(view.aliases.is_empty());

        let only_v2 = service
            .get_file_contents(
                &f.id,
                &ContentsQuery {
                    version: Some("v2".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(only_v2.len(), 1);
    }

    #[tokio::test]
    async fn test_listener_endpoint_must_be_http() {
        let (service, _) = service().await;
        let f = file(&service, "app.json").await;

        let err = service
            .create_listener(
                &f.id,
                CreateListenerRequest {
                    name: Some("hook".into()),
                    callback_endpoint: Some("ftp://example.com".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));

        let err = service
            .create_listener(&f.id, CreateListenerRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.missing_fields().unwrap().len(), 2);

        let listener = service
            .create_listener(
                &f.id,
                CreateListenerRequest {
                    name: Some("hook".into()),
                    callback_endpoint: Some(" https://example.com/hook ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(listener.callback_endpoint, "https://example.com/hook");

        let err = service
            .edit_listener(
                &listener.id,
                EditListenerRequest {
                    name: None,
                    callback_endpoint: Some("http://".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));
    }

    #[tokio::test]
    async fn test_malformed_listener_endpoints_are_rejected() {
        let (service, _) = service().await;
        let f = file(&service, "app.json").await;

        for endpoint in [
            "http://exa mple.com/hook",
            "http://[::1",
            "https://:99999999",
            "not a url",
        ] {
            let err = service
                .create_listener(
                    &f.id,
                    CreateListenerRequest {
                        name: Some("hook".into()),
                        callback_endpoint: Some(endpoint.into()),
                    },
                )
                .await
                .unwrap_err();
            assert!(
                matches!(err, KeeperError::NotValid(_)),
                "{endpoint} was accepted"
            );
        }
        assert!(service.get_file_listeners(&f.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listener_endpoint_is_normalised() {
        let (service, _) = service().await;
        let f = file(&service, "app.json").await;

        let listener = service
            .create_listener(
                &f.id,
                CreateListenerRequest {
                    name: Some("hook".into()),
                    callback_endpoint: Some("HTTP://Example.COM:80".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(listener.callback_endpoint, "http://example.com/");
    }

    #[tokio::test]
    async fn test_alias_paging_validation() {
        let (service, _) = service().await;
        let err = service
            .get_aliases(&AliasesQuery {
                limit: Some("ten".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::NotValid(_)));

        assert!(service
            .get_aliases(&AliasesQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_alias_file_links_require_ids() {
        let (service, _) = service().await;
        let f = file(&service, "app.json").await;
        let err = service
            .add_aliases_to_file(&f.id, AliasesRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::RequiredField(_)));
        let err = service
            .remove_file_aliases(&f.id, AliasesRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::RequiredField(_)));
    }

    /// Records the name of every span opened while it is the default subscriber.
    struct SpanNames(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanNames {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _: &tracing::span::Id,
            _: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0
                .lock()
                .unwrap()
                .push(attrs.metadata().name().to_owned());
        }
    }

    #[tokio::test]
    async fn test_read_operations_open_spans() {
        use tracing_subscriber::layer::SubscriberExt;

        let names = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(SpanNames(names.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let (service, _) = service().await;
        service.content_formats().await.unwrap();
        service.get_aliases(&AliasesQuery::default()).await.unwrap();

        let names = names.lock().unwrap();
        assert!(names.iter().any(|n| n == "content_formats"), "{names:?}");
        assert!(names.iter().any(|n| n == "get_aliases"), "{names:?}");
    }
}
