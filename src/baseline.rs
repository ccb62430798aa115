//! Baseline allow-lists for each markup context
//!
//! The lists start from the DOMPurify defaults and are tightened: anything
//! that can execute script, load active content, carry CSS blocks, or host
//! animation of arbitrary attributes is left out. Callers widen them through
//! the sanitizer overlay, never by editing these tables.
//!
//! HTML names are stored lowercase (HTML comparison is case-insensitive).
//! SVG and MathML names are stored with their exact vocabulary casing.

/// HTML elements permitted by default
pub(crate) const HTML_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "article", "aside", "audio", "b", "bdi", "bdo",
    "big", "blockquote", "body", "br", "caption", "center", "cite", "code", "col", "colgroup",
    "data", "dd", "del", "details", "dfn", "dir", "div", "dl", "dt", "em", "figcaption", "figure",
    "font", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html",
    "i", "img", "ins", "kbd", "label", "legend", "li", "main", "map", "mark", "menu", "meter",
    "nav", "nobr", "ol", "p", "picture", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp",
    "section", "small", "source", "span", "strike", "strong", "sub", "summary", "sup", "table",
    "tbody", "td", "tfoot", "th", "thead", "time", "title", "tr", "track", "tt", "u", "ul", "var",
    "video", "wbr",
];

/// HTML attributes permitted by default on any allowed element
pub(crate) const HTML_ATTRIBUTES: &[&str] = &[
    "abbr", "align", "alt", "autoplay", "background", "bgcolor", "border", "cellpadding",
    "cellspacing", "cite", "class", "clear", "color", "cols", "colspan", "controls", "coords",
    "crossorigin", "datetime", "decoding", "default", "dir", "download", "face", "headers",
    "height", "hidden", "high", "href", "hreflang", "id", "ismap", "kind", "label", "lang",
    "loading", "loop", "low", "max", "media", "min", "muted", "name", "noshade", "nowrap", "open",
    "optimum", "playsinline", "poster", "preload", "rel", "rev", "reversed", "role", "rows",
    "rowspan", "scope", "shape", "size", "sizes", "span", "src", "srclang", "srcset", "start",
    "style", "summary", "tabindex", "title", "translate", "type", "usemap", "valign", "value",
    "width", "xmlns",
];

/// HTML attribute-name prefixes permitted by default
pub(crate) const HTML_ATTRIBUTE_PREFIXES: &[&str] = &["aria-"];

/// HTML attributes holding a URL (or URL list)
pub(crate) const HTML_URL_ATTRIBUTES: &[&str] = &[
    "action",
    "background",
    "cite",
    "data",
    "dynsrc",
    "formaction",
    "href",
    "longdesc",
    "lowsrc",
    "poster",
    "src",
    "srcset",
    "xlink:href",
];

pub(crate) const HTML_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "ftp", "sms"];

pub(crate) const HTML_DATA_URI_TAGS: &[&str] = &["img"];

/// SVG elements permitted by default
pub(crate) const SVG_TAGS: &[&str] = &[
    "svg",
    "a",
    "altGlyph",
    "altGlyphDef",
    "altGlyphItem",
    "circle",
    "clipPath",
    "defs",
    "desc",
    "ellipse",
    "filter",
    "font",
    "g",
    "glyph",
    "glyphRef",
    "hkern",
    "image",
    "line",
    "linearGradient",
    "marker",
    "mask",
    "metadata",
    "path",
    "pattern",
    "polygon",
    "polyline",
    "radialGradient",
    "rect",
    "stop",
    "switch",
    "symbol",
    "text",
    "textPath",
    "title",
    "tref",
    "tspan",
    "view",
    "vkern",
    // filter primitives
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feDistantLight",
    "feDropShadow",
    "feFlood",
    "feFuncA",
    "feFuncB",
    "feFuncG",
    "feFuncR",
    "feGaussianBlur",
    "feImage",
    "feMerge",
    "feMergeNode",
    "feMorphology",
    "feOffset",
    "fePointLight",
    "feSpecularLighting",
    "feSpotLight",
    "feTile",
    "feTurbulence",
];

/// SVG attributes permitted by default
///
/// Animation-only attributes (`attributeName`, `values`, `from`, `to`, `by`)
/// are absent so that re-allowing an animation element does not also hand it
/// the means to rewrite `href`.
pub(crate) const SVG_ATTRIBUTES: &[&str] = &[
    "accent-height",
    "alignment-baseline",
    "ascent",
    "azimuth",
    "baseFrequency",
    "baseline-shift",
    "bias",
    "class",
    "clip",
    "clip-path",
    "clip-rule",
    "clipPathUnits",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cx",
    "cy",
    "d",
    "diffuseConstant",
    "direction",
    "display",
    "divisor",
    "dx",
    "dy",
    "edgeMode",
    "elevation",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "filterUnits",
    "flood-color",
    "flood-opacity",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "fx",
    "fy",
    "g1",
    "g2",
    "glyph-name",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "height",
    "href",
    "id",
    "image-rendering",
    "in",
    "in2",
    "k",
    "k1",
    "k2",
    "k3",
    "k4",
    "kernelMatrix",
    "kernelUnitLength",
    "kerning",
    "lang",
    "lengthAdjust",
    "letter-spacing",
    "lighting-color",
    "local",
    "marker-end",
    "marker-mid",
    "marker-start",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "mask",
    "maskContentUnits",
    "maskUnits",
    "media",
    "method",
    "mode",
    "name",
    "numOctaves",
    "offset",
    "opacity",
    "operator",
    "order",
    "orient",
    "orientation",
    "origin",
    "overflow",
    "paint-order",
    "path",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "points",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "r",
    "radius",
    "refX",
    "refY",
    "result",
    "rotate",
    "rx",
    "ry",
    "scale",
    "seed",
    "shape-rendering",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "style",
    "surfaceScale",
    "systemLanguage",
    "tabindex",
    "targetX",
    "targetY",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "textLength",
    "transform",
    "type",
    "u1",
    "u2",
    "unicode",
    "version",
    "vert-adv-y",
    "vert-origin-x",
    "vert-origin-y",
    "viewBox",
    "visibility",
    "width",
    "word-spacing",
    "wrap",
    "writing-mode",
    "x",
    "x1",
    "x2",
    "xChannelSelector",
    "xlink:href",
    "xlink:title",
    "xml:space",
    "xmlns",
    "xmlns:xlink",
    "y",
    "y1",
    "y2",
    "yChannelSelector",
    "z",
    "zoomAndPan",
];

pub(crate) const SVG_URL_ATTRIBUTES: &[&str] = &["href", "xlink:href", "src"];

pub(crate) const SVG_SCHEMES: &[&str] = &["http", "https"];

pub(crate) const SVG_DATA_URI_TAGS: &[&str] = &["image", "feImage"];

/// MathML elements permitted by default
pub(crate) const MATHML_TAGS: &[&str] = &[
    "math",
    "menclose",
    "merror",
    "mfenced",
    "mfrac",
    "mglyph",
    "mi",
    "mlabeledtr",
    "mmultiscripts",
    "mn",
    "mo",
    "mover",
    "mpadded",
    "mphantom",
    "mroot",
    "mrow",
    "ms",
    "mspace",
    "msqrt",
    "mstyle",
    "msub",
    "msubsup",
    "msup",
    "mtable",
    "mtd",
    "mtext",
    "mtr",
    "munder",
    "munderover",
];

/// MathML attributes permitted by default
pub(crate) const MATHML_ATTRIBUTES: &[&str] = &[
    "accent",
    "accentunder",
    "align",
    "bevelled",
    "class",
    "close",
    "columnalign",
    "columnlines",
    "columnspacing",
    "columnspan",
    "denomalign",
    "depth",
    "dir",
    "display",
    "displaystyle",
    "fence",
    "frame",
    "height",
    "href",
    "id",
    "largeop",
    "length",
    "linethickness",
    "lquote",
    "lspace",
    "mathbackground",
    "mathcolor",
    "mathsize",
    "mathvariant",
    "maxsize",
    "minsize",
    "movablelimits",
    "notation",
    "numalign",
    "open",
    "rowalign",
    "rowlines",
    "rowspacing",
    "rowspan",
    "rquote",
    "rspace",
    "scriptlevel",
    "scriptminsize",
    "scriptsizemultiplier",
    "selection",
    "separator",
    "separators",
    "stretchy",
    "style",
    "subscriptshift",
    "supscriptshift",
    "symmetric",
    "voffset",
    "width",
    "xlink:href",
    "xmlns",
    "xmlns:xlink",
];

pub(crate) const MATHML_URL_ATTRIBUTES: &[&str] = &["href", "xlink:href"];

pub(crate) const MATHML_SCHEMES: &[&str] = &["http", "https", "mailto"];

pub(crate) const MATHML_DATA_URI_TAGS: &[&str] = &[];

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_BEARING: &[&str] = &[
        "script",
        "style",
        "iframe",
        "object",
        "embed",
        "template",
        "form",
        "input",
        "button",
        "textarea",
        "meta",
        "link",
        "base",
        "svg",
        "math",
    ];

    #[test]
    fn test_html_baseline_is_lowercase() {
        for tag in HTML_TAGS.iter().chain(HTML_ATTRIBUTES) {
            assert_eq!(*tag, tag.to_ascii_lowercase(), "{tag} must be stored lowercase");
        }
    }

    #[test]
    fn test_html_baseline_excludes_active_content() {
        for tag in SCRIPT_BEARING {
            assert!(!HTML_TAGS.contains(tag), "{tag} must not be in the HTML baseline");
        }
    }

    #[test]
    fn test_svg_baseline_excludes_animation_and_embedding() {
        for tag in [
            "script",
            "style",
            "animate",
            "animateColor",
            "animateMotion",
            "animateTransform",
            "set",
            "foreignObject",
            "use",
            "iframe",
            "handler",
            "listener",
        ] {
            assert!(!SVG_TAGS.contains(&tag), "{tag} must not be in the SVG baseline");
        }
        for attr in ["attributeName", "values", "from", "to", "by"] {
            assert!(!SVG_ATTRIBUTES.contains(&attr));
        }
    }

    #[test]
    fn test_svg_baseline_keeps_camel_case() {
        assert!(SVG_TAGS.contains(&"clipPath"));
        assert!(SVG_TAGS.contains(&"linearGradient"));
        assert!(SVG_ATTRIBUTES.contains(&"viewBox"));
        assert!(!SVG_ATTRIBUTES.contains(&"viewbox"));
    }

    #[test]
    fn test_mathml_baseline_excludes_integration_points() {
        for tag in ["maction", "semantics", "annotation", "annotation-xml"] {
            assert!(!MATHML_TAGS.contains(&tag));
        }
    }

    #[test]
    fn test_no_event_handlers_in_baselines() {
        for attr in HTML_ATTRIBUTES
            .iter()
            .chain(SVG_ATTRIBUTES)
            .chain(MATHML_ATTRIBUTES)
        {
            assert!(!attr.to_ascii_lowercase().starts_with("on"), "{attr}");
        }
    }

    #[test]
    fn test_schemes_never_include_script_or_data() {
        for scheme in HTML_SCHEMES.iter().chain(SVG_SCHEMES).chain(MATHML_SCHEMES) {
            assert!(!["javascript", "vbscript", "data"].contains(scheme));
        }
    }
}
