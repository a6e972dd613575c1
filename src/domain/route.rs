use serde::{Deserialize, Serialize};
use std::fmt;

pub const WILDCARD_PATH: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
    /// `RouterModule.forRoot(routes)`
    Root,
    /// `RouterModule.forChild(routes)`
    Child,
}

impl RouterMode {
    pub fn factory_name(self) -> &'static str {
        match self {
            RouterMode::Root => "forRoot",
            RouterMode::Child => "forChild",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatch {
    #[default]
    Prefix,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Component(String),
    LazyModule(String),
    Redirect { to: String, path_match: PathMatch },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub target: RouteTarget,
}

impl Route {
    pub fn component(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::Component(component.into()),
        }
    }

    pub fn lazy(path: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::LazyModule(module.into()),
        }
    }

    pub fn redirect(path: impl Into<String>, to: impl Into<String>, path_match: PathMatch) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::Redirect {
                to: to.into(),
                path_match,
            },
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.path == WILDCARD_PATH
    }

    fn segments(&self) -> Vec<&str> {
        if self.path.is_empty() {
            Vec::new()
        } else {
            self.path.split('/').collect()
        }
    }

    /// Problems with the route's own shape, independent of any module.
    pub fn shape_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.path.starts_with('/') {
            problems.push(format!("route path '{}' cannot start with a slash", self.path));
        }
        if !self.is_wildcard() && self.segments().contains(&WILDCARD_PATH) {
            problems.push(format!(
                "'**' only matches anything as the whole path; in '{}' it is a literal segment",
                self.path
            ));
        }
        if let RouteTarget::Redirect { path_match, .. } = &self.target {
            if self.path.is_empty() && *path_match != PathMatch::Full {
                problems.push(
                    "empty-path redirect needs path_match = \"full\", otherwise it matches every URL"
                        .to_string(),
                );
            }
        }
        problems
    }

    /// Whether every URL that reaches `later` is already taken by this
    /// route when the router walks routes in declaration order.
    ///
    /// Lazy routes only consume their prefix, so they never shadow. A
    /// prefix-match redirect takes every URL that starts with its path.
    pub fn shadows(&self, later: &Route) -> bool {
        if matches!(self.target, RouteTarget::LazyModule(_)) {
            return false;
        }
        if self.is_wildcard() {
            return true;
        }

        let mine = self.segments();
        let theirs = later.segments();
        let prefix = matches!(
            self.target,
            RouteTarget::Redirect {
                path_match: PathMatch::Prefix,
                ..
            }
        );
        let lengths_fit = if prefix {
            theirs.len() >= mine.len()
        } else {
            theirs.len() == mine.len()
        };
        lengths_fit
            && mine
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.starts_with(':') || a == b)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{} -> ", self.path)?;
        match &self.target {
            RouteTarget::Component(component) => f.write_str(component),
            RouteTarget::LazyModule(module) => write!(f, "{} (lazy)", module),
            RouteTarget::Redirect { to, path_match } => {
                write!(f, "redirect /{}", to)?;
                if *path_match == PathMatch::Full {
                    f.write_str(" (full match)")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub mode: RouterMode,
    pub routes: Vec<Route>,
}

impl RouterConfig {
    /// `(index_of_shadowing_route, index_of_shadowed_route)` pairs.
    pub fn shadowed_routes(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (later_idx, later) in self.routes.iter().enumerate() {
            if let Some(earlier_idx) = self.routes[..later_idx]
                .iter()
                .position(|earlier| earlier.shadows(later))
            {
                pairs.push((earlier_idx, later_idx));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_route_shadows_literal_route() {
        let router = RouterConfig {
            mode: RouterMode::Child,
            routes: vec![
                Route::component("products", "ProductListComponent"),
                Route::component("products/:id", "ProductDetailComponent"),
                Route::component("products/new", "ProductFormComponent"),
                Route::component("products/:id/edit", "ProductFormComponent"),
            ],
        };
        assert_eq!(router.shadowed_routes(), vec![(1, 2)]);
    }

    #[test]
    fn test_wildcard_shadows_everything_after_it() {
        let router = RouterConfig {
            mode: RouterMode::Root,
            routes: vec![
                Route::component("", "HomeComponent"),
                Route::redirect("**", "", PathMatch::Prefix),
                Route::component("about", "AboutComponent"),
            ],
        };
        assert_eq!(router.shadowed_routes(), vec![(1, 2)]);
    }

    #[test]
    fn test_prefix_redirect_shadows_longer_paths() {
        let router = RouterConfig {
            mode: RouterMode::Child,
            routes: vec![
                Route::redirect("products", "catalog", PathMatch::Prefix),
                Route::component("products/:id", "ProductDetailComponent"),
                Route::component("productsearch", "ProductSearchComponent"),
            ],
        };
        assert_eq!(router.shadowed_routes(), vec![(0, 1)]);

        let full = Route::redirect("products", "catalog", PathMatch::Full);
        assert!(!full.shadows(&Route::component("products/:id", "ProductDetailComponent")));
        assert!(full.shadows(&Route::component("products", "ProductListComponent")));
    }

    #[test]
    fn test_wildcard_segment_inside_path() {
        let admin = Route::component("admin/**", "AdminFallbackComponent");
        assert_eq!(admin.shape_problems().len(), 1);
        assert!(admin.shape_problems()[0].contains("literal segment"));
        assert!(!admin.shadows(&Route::component("admin/users", "UsersComponent")));

        let section = Route::component("admin/:section", "SectionComponent");
        assert!(section.shadows(&admin));
    }

    #[test]
    fn test_lazy_route_does_not_shadow() {
        let lazy = Route::lazy("products", "ProductsModule");
        let detail = Route::component("products", "ProductListComponent");
        assert!(!lazy.shadows(&detail));
    }

    #[test]
    fn test_shape_problems() {
        assert_eq!(Route::component("/about", "AboutComponent").shape_problems().len(), 1);
        assert_eq!(Route::redirect("", "home", PathMatch::Prefix).shape_problems().len(), 1);
        assert!(Route::redirect("", "home", PathMatch::Full).shape_problems().is_empty());
        assert!(Route::redirect("**", "", PathMatch::Prefix).shape_problems().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Route::lazy("products", "ProductsModule").to_string(),
            "/products -> ProductsModule (lazy)"
        );
        assert_eq!(
            Route::redirect("**", "", PathMatch::Prefix).to_string(),
            "/** -> redirect /"
        );
    }
}
