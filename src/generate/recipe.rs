//! The build recipe written into every challenge build context.

/// Name of the generated C source inside the build context.
pub const SOURCE_NAME: &str = "program.c";

/// Name of the recipe inside the build context.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Name of the compiled binary exported to the job's output directory.
pub const BINARY_NAME: &str = "challenge";

/// Build argument carrying the selected compiler flags.
pub const CFLAGS_ARG: &str = "CFLAGS";

/// Two-stage recipe: compile statically on Alpine, then ship only the
/// binary on `scratch`. Exporting the final stage's filesystem leaves
/// `/challenge` as `<out>/challenge`.
pub fn dockerfile() -> String {
    format!(
        r#"# syntax=docker/dockerfile:1
FROM alpine AS build
RUN apk add --no-cache gcc musl-dev
WORKDIR /src
COPY {source} .
ARG {arg}
RUN gcc ${arg} -static -o /bin/{bin} {source}
FROM scratch
COPY --from=build /bin/{bin} /{bin}
ENTRYPOINT ["/{bin}"]
"#,
        source = SOURCE_NAME,
        arg = CFLAGS_ARG,
        bin = BINARY_NAME,
    )
}
