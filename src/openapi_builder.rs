use crate::config::VersionConfig;
use crate::context::{path_key, RouteContext};
use crate::definitions::model::ModelSchemaGenerator;
use crate::definitions::DefinitionRegistry;
use crate::error::Result;
use crate::metadata::{HttpMethod, MetadataProvider, RouteDescriptor};
use crate::parameters::{self, Parameter};
use crate::responses::{ResponseComposer, Responses};
use crate::schema::Schema;
use crate::security::{create_generator, SecurityDefinitions, SecurityDefinitionsGenerator, SecurityRequirement};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Swagger 2.0 document builder
pub struct OpenApiBuilder {
    config: VersionConfig,
    /// Only routes whose URI starts with this prefix are documented
    route_filter: Option<String>,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    registry: DefinitionRegistry,
    security: Option<Box<dyn SecurityDefinitionsGenerator>>,
    security_definitions: Option<SecurityDefinitions>,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    pub description: String,
    /// API version
    pub version: String,
}

/// Swagger PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

/// Swagger Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    pub description: String,
    pub deprecated: bool,
    /// Path parameters first, then body or query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    pub responses: Responses,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub swagger: String,
    pub info: Info,
    pub host: String,
    #[serde(rename = "basePath")]
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    pub paths: IndexMap<String, PathItem>,
    pub definitions: IndexMap<String, Schema>,
    #[serde(rename = "securityDefinitions", skip_serializing_if = "Option::is_none")]
    pub security_definitions: Option<SecurityDefinitions>,
}

impl OpenApiBuilder {
    /// Create a builder for one API version.
    ///
    /// Fails when the security configuration is invalid.
    pub fn new(config: VersionConfig) -> Result<Self> {
        debug!("Initializing OpenApiBuilder for version {}", config.app_version);
        let security = create_generator(&config)?;
        Ok(Self {
            config,
            route_filter: None,
            paths: IndexMap::new(),
            registry: DefinitionRegistry::new(),
            security,
            security_definitions: None,
        })
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: String) -> Self {
        self.config.title = title;
        self.config.app_version = version;
        self.config.description = description;
        self
    }

    /// Only document routes whose URI starts with `prefix`
    pub fn with_route_filter(mut self, prefix: impl Into<String>) -> Self {
        self.route_filter = Some(prefix.into());
        self
    }

    /// Run a full generation pass over the provider's routes
    pub fn generate<P>(mut self, provider: &P) -> Result<OpenApiDocument>
    where
        P: MetadataProvider + ?Sized,
    {
        let routes = provider.routes();
        info!(
            "Generating version {} from {} routes",
            self.config.app_version,
            routes.len()
        );

        if let Some(security) = &self.security {
            self.security_definitions = Some(security.generate(&routes)?);
        }

        for route in &routes {
            if self.is_documented(route) {
                self.add_route(route, provider)?;
            }
        }

        Ok(self.build())
    }

    fn is_documented(&self, route: &RouteDescriptor) -> bool {
        if route
            .name
            .as_ref()
            .is_some_and(|name| self.config.ignored_routes.contains(name))
        {
            debug!("Ignoring route {} by name", route.uri);
            return false;
        }

        match &self.route_filter {
            Some(prefix) => route.original_uri().starts_with(prefix.as_str()),
            None => true,
        }
    }

    /// Add every method of a route to the document
    pub fn add_route<P>(&mut self, route: &RouteDescriptor, provider: &P) -> Result<()>
    where
        P: MetadataProvider + ?Sized,
    {
        for &method in &route.methods {
            if self.config.is_method_ignored(method) {
                continue;
            }

            let path = path_key(route, &self.config.base_path);
            if self
                .paths
                .get(&path)
                .and_then(|item| item.operation(method))
                .is_some()
            {
                warn!("Duplicate operation {} {}, keeping the first one", method, path);
                continue;
            }

            debug!("Adding route: {} {}", method, path);
            let ctx = RouteContext::resolve(route, method, provider, &self.config)?;
            let operation = self.operation(&ctx, provider)?;
            *self.paths.entry(path).or_default().slot(method) = Some(operation);
        }
        Ok(())
    }

    fn operation<P>(&mut self, ctx: &RouteContext<'_>, provider: &P) -> Result<Operation>
    where
        P: MetadataProvider + ?Sized,
    {
        ModelSchemaGenerator::new(provider, &self.config).generate(ctx, &mut self.registry)?;

        let responses = ResponseComposer::new(&self.config).generate(ctx)?;

        let parameters = parameters::generate(ctx);

        let security = self
            .security
            .as_ref()
            .map(|generator| generator.generate_for_route(ctx))
            .filter(|requirements| !requirements.is_empty());

        Ok(Operation {
            summary: ctx.annotations.summary.clone(),
            description: ctx.annotations.description.clone(),
            deprecated: ctx.annotations.deprecated,
            parameters: (!parameters.is_empty()).then_some(parameters),
            responses,
            security,
        })
    }

    /// Build the final Swagger document
    pub fn build(self) -> OpenApiDocument {
        debug!(
            "Building final document: {} paths, {} definitions",
            self.paths.len(),
            self.registry.len()
        );

        let non_empty = |values: Vec<String>| (!values.is_empty()).then_some(values);
        let definitions = self.registry.into_definitions();
        let mut paths = self.paths;
        drop_dangling_references(&mut paths, &definitions);

        OpenApiDocument {
            swagger: "2.0".to_string(),
            info: Info {
                title: self.config.title,
                description: self.config.description,
                version: self.config.app_version,
            },
            host: strip_scheme(&self.config.host).to_string(),
            base_path: self.config.base_path,
            schemes: non_empty(self.config.schemes),
            consumes: non_empty(self.config.consumes),
            produces: non_empty(self.config.produces),
            paths,
            definitions,
            security_definitions: self.security_definitions,
        }
    }
}

/// Remove response schemas whose definition was never emitted
fn drop_dangling_references(paths: &mut IndexMap<String, PathItem>, definitions: &IndexMap<String, Schema>) {
    let operations = paths.values_mut().flat_map(|item| {
        [
            &mut item.get,
            &mut item.post,
            &mut item.put,
            &mut item.delete,
            &mut item.patch,
            &mut item.options,
            &mut item.head,
        ]
    });

    for operation in operations.flatten() {
        for (code, response) in operation.responses.iter_mut() {
            let dangling = response
                .schema
                .as_ref()
                .and_then(Schema::referenced_definition)
                .is_some_and(|name| !definitions.contains_key(name));
            if dangling {
                debug!("No definition for the {} response schema, omitting it", code);
                response.schema = None;
            }
        }
    }
}

fn strip_scheme(host: &str) -> &str {
    host.strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host)
}
