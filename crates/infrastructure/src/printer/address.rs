use domain::printer::PrinterError;

/// Socket target parsed from a descriptor's `host[:port]` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterAddress {
    pub host: String,
    pub port: u16,
}

impl PrinterAddress {
    /// Parse `host`, `host:port`, `[v6]` or `[v6]:port`. A missing port falls back
    /// to `default_port`.
    pub fn parse(input: &str, default_port: u16) -> Result<Self, PrinterError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PrinterError::InvalidAddress("address is empty".to_string()));
        }

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid(input, "unterminated IPv6 literal"))?;
            let port = match tail {
                "" => None,
                tail => Some(
                    tail.strip_prefix(':')
                        .ok_or_else(|| invalid(input, "unexpected text after IPv6 literal"))?,
                ),
            };
            (host, port)
        } else {
            match input.split_once(':') {
                Some((_, rest)) if rest.contains(':') => {
                    return Err(invalid(input, "IPv6 hosts must be bracketed"));
                }
                Some((host, port)) => (host, Some(port)),
                None => (input, None),
            }
        };

        if host.is_empty() {
            return Err(invalid(input, "host is empty"));
        }
        if host
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
        {
            return Err(invalid(input, "host contains illegal characters"));
        }

        let port = match port {
            None => default_port,
            Some(raw) => match raw.parse::<u16>() {
                Ok(0) | Err(_) => return Err(invalid(input, "port must be 1-65535")),
                Ok(port) => port,
            },
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    fn is_ipv6(&self) -> bool {
        self.host.contains(':')
    }
}

fn invalid(input: &str, reason: &str) -> PrinterError {
    PrinterError::InvalidAddress(format!("{input}: {reason}"))
}

impl std::fmt::Display for PrinterAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ipv6() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
