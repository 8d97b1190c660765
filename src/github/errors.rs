use octocrab::Error as OctocrabError;

#[derive(Debug)]
pub enum GitHubError {
    TokenNotFound(String),
    ApiError(OctocrabError),
    InvalidRepository(String),
    ClientSetup(String),
    NetworkError(String),
}

impl From<OctocrabError> for GitHubError {
    fn from(err: OctocrabError) -> Self {
        GitHubError::ApiError(err)
    }
}

impl GitHubError {
    /// HTTP status of the failed request, when GitHub answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GitHubError::ApiError(octocrab::Error::GitHub { source, .. }) => {
                Some(source.status_code.as_u16())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for GitHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitHubError::TokenNotFound(msg) => {
                writeln!(f, "GitHub Authentication Error")?;
                writeln!(f, "──────────────────────────")?;
                write!(f, "🔑 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(
                    f,
                    "   → Set token directly: export UPSTREAM_RESET_GITHUB_TOKEN=your_token"
                )?;
                writeln!(
                    f,
                    "   → Or reuse the GitHub CLI token: export GITHUB_TOKEN=\"$(gh auth token)\""
                )?;
                writeln!(
                    f,
                    "   → Create token at: https://github.com/settings/tokens"
                )?;
                write!(
                    f,
                    "     (needs 'repo' scope to rewrite branches of private forks)"
                )
            }
            GitHubError::ApiError(octocrab_err) => {
                writeln!(f, "GitHub API Error")?;
                writeln!(f, "────────────────")?;

                match octocrab_err {
                    octocrab::Error::GitHub { source, .. } => {
                        writeln!(f, "🌐 HTTP {}: {}", source.status_code, source.message)?;
                        writeln!(f)?;

                        match source.status_code.as_u16() {
                            401 => {
                                writeln!(f, "🔧 AUTHENTICATION FAILED:")?;
                                writeln!(f, "   → Token is invalid or expired")?;
                                write!(
                                    f,
                                    "   → Or export UPSTREAM_RESET_GITHUB_TOKEN=\"$(gh auth token)\""
                                )
                            }
                            403 => {
                                writeln!(f, "🔧 PERMISSION DENIED:")?;
                                writeln!(f, "   → Token lacks push access to the fork")?;
                                write!(
                                    f,
                                    "   → May need 'repo' scope: https://github.com/settings/tokens"
                                )
                            }
                            404 => {
                                writeln!(f, "🔧 RESOURCE NOT FOUND:")?;
                                writeln!(f, "   → Repository may not exist or be private")?;
                                write!(
                                    f,
                                    "   → Branch may have been deleted since the status was read"
                                )
                            }
                            422 => {
                                writeln!(f, "🔧 VALIDATION ERROR:")?;
                                writeln!(
                                    f,
                                    "   → Reference may already exist (e.g. a backup from this second)"
                                )?;
                                write!(
                                    f,
                                    "   → Or the commit is unknown to the fork's object store"
                                )
                            }
                            _ => {
                                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                                writeln!(
                                    f,
                                    "   → Test connection: curl -I https://api.github.com"
                                )?;
                                write!(f, "   → Check rate limits: gh api rate_limit")
                            }
                        }
                    }
                    octocrab::Error::Http { .. } => {
                        writeln!(f, "🌐 Network connection failed to GitHub API")?;
                        writeln!(f)?;
                        writeln!(f, "🔧 NETWORK TROUBLESHOOTING:")?;
                        writeln!(f, "   → Test HTTPS: curl -I https://api.github.com")?;
                        writeln!(f, "   → Check proxy settings: https_proxy / HTTPS_PROXY")?;
                        write!(f, "📊 GitHub status: https://status.github.com")
                    }
                    _ => {
                        write!(f, "🌐 {octocrab_err}\n\n")?;
                        writeln!(f, "🔧 TROUBLESHOOTING:")?;
                        writeln!(f, "   → Test connection: curl -I https://api.github.com")?;
                        write!(f, "   → Check rate limits: gh api rate_limit")
                    }
                }
            }
            GitHubError::InvalidRepository(msg) => {
                writeln!(f, "Invalid Repository")?;
                writeln!(f, "──────────────────")?;
                write!(f, "📂 {msg}\n\n")?;
                write!(f, "🔧 Expected the form owner/repo, e.g. octocat/hello-world")
            }
            GitHubError::NetworkError(msg) => {
                writeln!(f, "GitHub Network Error")?;
                writeln!(f, "───────────────────")?;
                write!(f, "🌐 {msg}\n\n")?;
                writeln!(f, "🔧 LOCAL TROUBLESHOOTING:")?;
                writeln!(f, "   → Verify DNS resolution: nslookup api.github.com")?;
                write!(f, "   → Test HTTPS access: curl -I https://api.github.com")
            }
            GitHubError::ClientSetup(msg) => {
                writeln!(f, "GitHub Client Setup Error")?;
                writeln!(f, "─────────────────────────")?;
                write!(f, "⚙️  {msg}")
            }
        }
    }
}

impl std::error::Error for GitHubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitHubError::ApiError(err) => Some(err),
            _ => None,
        }
    }
}
