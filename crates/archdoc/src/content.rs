//! Built-in report: the EWallet Flutter SDK architecture guide.

use archdoc_document::{Report, TitlePage};

const ARCH_OVERVIEW: &str = r#"graph TB
    subgraph "Flutter Application"
        A[Flutter App<br/>Your New App] --> B[EWallet SDK<br/>Dart Interface]
    end
    
    subgraph "SDK Abstraction Layer"
        B --> C{Platform Detection}
        C -->|Android/iOS| D[WebView Implementation]
        C -->|Web| E[HtmlElementView Implementation]
        C -->|Desktop| F[Platform Channel Implementation]
    end
    
    subgraph "Platform-Specific Layer"
        D --> G[InAppWebView Plugin<br/>Mobile]
        E --> H[platformViewRegistry<br/>Web Only]
        F --> I[Native WebView<br/>Windows/macOS/Linux]
    end
    
    subgraph "Angular eWallet Application"
        G --> J[Angular 19 App<br/>Loaded in WebView]
        H --> J
        I --> J
    end
    
    subgraph "Communication Bridge"
        J <-->|JavaScript Bridge| K[window.flutter_inappwebview<br/>Mobile/Desktop]
        J <-->|postMessage| L[iframe Communication<br/>Web Only]
    end
    
    K --> B
    L --> B"#;

const MOBILE_FLOW: &str = r#"sequenceDiagram
    participant App as Flutter App
    participant SDK as EWallet SDK
    participant WV as InAppWebView
    participant Bridge as JavaScript Bridge
    participant Angular as Angular eWallet
    
    App->>SDK: initAuth(credentials)
    SDK->>SDK: Generate JWT token
    SDK->>WV: Create HeadlessInAppWebView
    WV->>Angular: GET /api.auth.client?auth=JWT
    Angular->>Angular: Validate JWT, Set cookies
    Angular-->>WV: Authentication successful
    WV-->>SDK: onLoadStop callback
    SDK->>WV: Dispose after 30s
    SDK-->>App: Auth completed
    
    App->>SDK: buildDashboard()
    SDK->>Bridge: Register JavaScript handlers
    SDK->>WV: Initialize visible WebView
    WV->>Angular: Load baseUrl
    Angular-->>WV: Return Angular SPA
    WV->>WV: Render Angular components
    SDK->>Angular: evaluateJavascript()<br/>Send client metadata
    
    App->>SDK: openPaymentWindow(orderId, token)
    SDK->>WV: Create modal WebView
    WV->>Angular: Load /paywindow
    Angular->>Bridge: callHandler('paymentSuccess')
    Bridge->>SDK: Trigger Dart callback
    SDK-->>App: Return PaymentResponse"#;

const STATES: &str = r#"stateDiagram-v2
    [*] --> Uninitialized
    
    Uninitialized --> Initializing: SDK.initialize()
    Initializing --> Initialized: Platform detected
    
    Initialized --> Authenticating: initAuth()
    Authenticating --> Authenticated: JWT validated<br/>Cookies set
    
    Authenticated --> DashboardLoading: buildDashboard()
    DashboardLoading --> DashboardReady: Angular loaded<br/>Bridges established
    
    DashboardReady --> PaymentInitiated: openPaymentWindow()
    PaymentInitiated --> PaymentProcessing: User enters info
    
    PaymentProcessing --> PaymentSuccess: Payment confirmed
    PaymentProcessing --> PaymentError: Payment failed
    
    PaymentSuccess --> DashboardReady: Modal closed
    PaymentError --> DashboardReady: Error handled
    
    DashboardReady --> LoggingOut: logout()
    LoggingOut --> Initialized: Session cleared
    
    Initialized --> [*]: SDK disposed"#;

const WEB_ARCH: &str = r#"graph TB
    subgraph "Flutter Web App"
        A[Flutter Widget Tree] --> B[EWallet SDK Web]
    end
    
    subgraph "Platform View"
        B --> C[platformViewRegistry]
        C --> D[Create iframe Element]
    end
    
    subgraph "Integration"
        D --> E[HtmlElementView Widget]
        E --> F[Render in Flutter Canvas]
    end
    
    subgraph "Angular App"
        F --> G[iframe loads Angular]
        G --> H[Angular 19 Rendered]
    end
    
    subgraph "Communication"
        B <-->|postMessage| I[window.postMessage API]
        I <-->|Origin validated| H
    end"#;

const DISTRIBUTION: &str = r#"graph LR
    A[SDK Development] --> B[flutter pub publish]
    B --> C[pub.dev Registry]
    C --> D[Consumer pubspec.yaml]
    D --> E{Platform Build}
    E -->|Android| F[APK with AAR]
    E -->|iOS| G[IPA with Framework]
    E -->|Web| H[JavaScript Bundle]
    E -->|Desktop| I[Native Binary]
    F --> J[User Device]
    G --> J
    H --> K[Browser]
    I --> L[Desktop PC]
    J --> M[Load Angular from Server]
    K --> M
    L --> M"#;

const INTERFACE_CODE: &str = r#"abstract class EWalletInterface {
  Future<void> initialize({
    required String baseUrl,
    required String clientName,
  });
  
  Future<void> initAuth({
    required String clientName,
    required String clientId,
    required String clientSecret,
    required String userEmail,
  });
  
  Future<PaymentResponse> openPaymentWindow({
    required String orderId,
    required String token,
  });
  
  Future<void> logout();
  
  Widget buildDashboard({
    required String clientName,
  });
}"#;

const USAGE_CODE: &str = r#"// Initialize SDK
final ewallet = EWallet.create();
await ewallet.initialize(
  baseUrl: 'https://ewallet.example.com',
  clientName: 'MyApp',
);

// Authenticate user
await ewallet.initAuth(
  clientName: 'MyApp',
  clientId: 'client_123',
  clientSecret: 'secret_key',
  userEmail: 'user@example.com',
);

// Display dashboard in Flutter widget
Widget build(BuildContext context) {
  return Scaffold(
    appBar: AppBar(title: Text('eWallet')),
    body: ewallet.buildDashboard(clientName: 'MyApp'),
  );
}

// Handle payment
try {
  final response = await ewallet.openPaymentWindow(
    orderId: 'order_123',
    token: 'payment_token_456',
  );
  print('Payment successful: ${response.transactionId}');
  showSuccess(response);
} catch (e) {
  print('Payment failed: $e');
  showError(e);
}"#;

/// Title page, ten sections, five diagrams and two code listings.
pub(crate) fn ewallet_report() -> Report {
    Report::new()
        .title_page(TitlePage {
            title: "Cross-Platform Hybrid SDK Architecture".to_owned(),
            subtitle: "Flutter-Angular eWallet Integration".to_owned(),
            tagline: "Multi-Platform WebView Bridge SDK Pattern".to_owned(),
            summary: "A comprehensive guide to building a unified SDK that embeds Angular applications \
                within Flutter apps across Android, iOS, Web, Windows, macOS, and Linux platforms \
                using platform-specific WebView implementations and JavaScript-to-Native bridges."
                .to_owned(),
            version: "1.0.0".to_owned(),
        })
        .section(
            "1. Architecture Overview",
            [
                "This architecture pattern is called the <b>Cross-Platform Hybrid SDK Architecture with Platform-Specific Abstraction Layer</b> or <b>Multi-Platform WebView Bridge SDK Pattern</b>.",
                "It combines WebView embedding, JavaScript-to-Native bridges, and platform-specific implementations under a unified Dart API interface. The SDK functions as a Flutter Plugin Package that provides a single API interface while using different platform-specific implementations underneath.",
                "Your eWallet SDK will embed your Angular 19 application across all platforms (Android, iOS, Web, Desktop) while maintaining bidirectional communication through JavaScript bridges and preserving your existing Angular codebase without modifications.",
            ],
        )
        .diagram(ARCH_OVERVIEW, "High-Level Architecture Overview", "arch_overview")
        .section(
            "2. Implementation Steps",
            [
                "<b>Step 1: Create Flutter Plugin Package</b> - Use flutter create --template=plugin to create a multi-platform plugin package supporting Android, iOS, Web, Windows, macOS, and Linux.",
                "<b>Step 2: Define Platform-Agnostic Interface</b> - Create an abstract EWalletInterface class that defines methods like initialize(), initAuth(), openPaymentWindow(), logout(), and buildDashboard().",
                "<b>Step 3: Implement Conditional Platform Imports</b> - Use Dart's conditional imports (dart.library.io for mobile, dart.library.html for web) to automatically select correct implementation at compile time.",
                "<b>Step 4: Build Mobile Implementation</b> - Use flutter_inappwebview plugin to wrap native WebView components (WKWebView for iOS, AndroidWebView for Android) with JavaScript-to-Dart communication bridges.",
                "<b>Step 5: Build Web Implementation</b> - Use HtmlElementView with platformViewRegistry to embed HTML iframe elements, implementing communication via window.postMessage() API.",
                "<b>Step 6: Build Desktop Implementation</b> - Use InAppWebView with desktop support (WebView2 for Windows, WKWebView for macOS, WebKitGTK for Linux) for consistent cross-desktop experience.",
            ],
        )
        .diagram(MOBILE_FLOW, "Mobile Authentication and Payment Flow", "mobile_flow")
        .section("3. Platform-Agnostic Interface Code", "")
        .code(INTERFACE_CODE, "dart")
        .section("4. SDK Usage Example", "")
        .code(USAGE_CODE, "dart")
        .section(
            "5. Platform-Specific Implementation Details",
            [
                "<b>Android Implementation:</b> Uses android.webkit.WebView wrapped by InAppWebView plugin. JavaScript bridge established via addJavaScriptHandler(). Cookies managed through CookieManager for SSO session persistence. Payment modal displayed as full-screen Activity or Dialog fragment.",
                "<b>iOS Implementation:</b> Uses WKWebView (Apple's modern WebView). JavaScript bridge through window.webkit.messageHandlers wrapped by InAppWebView plugin. Cookies managed via WKWebsiteDataStore. Payment modal presented as new ViewController modally.",
                "<b>Web Implementation:</b> Uses standard HTML iframe element via dart:html library. Communication through window.postMessage() API for cross-origin messaging. iframe registered with ui_web.platformViewRegistry.registerViewFactory() to integrate into Flutter widget tree. Payment modal as absolute positioned div overlay with nested iframe.",
                "<b>Windows Desktop:</b> Uses Microsoft Edge WebView2 (Chromium-based) through InAppWebView plugin. JavaScript bridge same as mobile implementation. High performance with modern web standards support.",
                "<b>macOS Desktop:</b> Uses WKWebView (same as iOS) with InAppWebView plugin providing consistent API. Native performance with Apple's web rendering engine.",
                "<b>Linux Desktop:</b> Uses WebKitGTK for web rendering. InAppWebView plugin provides unified interface across all desktop platforms.",
            ],
        )
        .diagram(STATES, "SDK State Management Lifecycle", "states")
        .section(
            "6. Bidirectional Communication Architecture",
            [
                "<b>Mobile/Desktop Communication (InAppWebView):</b> Flutter SDK registers Dart callback handlers using addJavaScriptHandler() method. Angular application calls these handlers via window.flutter_inappwebview.callHandler('handlerName', data). Responses returned as JavaScript Promises. Flutter can send data to Angular using evaluateJavascript() method.",
                "<b>Web Communication (iframe + postMessage):</b> Flutter web SDK listens for messages using window.onMessage.listen(). Angular application posts messages via window.parent.postMessage(data, targetOrigin). Origin validation ensures security. Bidirectional messaging supports complex data structures through JSON serialization.",
                "<b>Event Types Supported:</b> paymentSuccess (transaction completed), paymentError (transaction failed), paymentProcessing (awaiting confirmation), closePaymentWindow (user cancelled), dashboardReady (UI loaded), authenticationComplete (session established).",
            ],
        )
        .diagram(WEB_ARCH, "Web Platform Architecture", "web_arch")
        .diagram(DISTRIBUTION, "SDK Distribution Pipeline", "distribution")
        .section(
            "7. Package Distribution Process",
            [
                "<b>Step 1 - Development:</b> Create SDK package with all platform implementations in a single codebase. Use conditional imports to separate platform-specific code.",
                "<b>Step 2 - Publishing:</b> Run 'flutter pub publish' to upload package to pub.dev registry. Package includes all platform code but only relevant parts compiled for each target.",
                "<b>Step 3 - Consumer Integration:</b> Developers add your SDK to pubspec.yaml dependencies. Simple one-line dependency declaration pulls entire multi-platform SDK.",
                "<b>Step 4 - Platform Compilation:</b> When building for specific platform, Flutter compiler includes only relevant code. Android builds get AAR bundled in APK, iOS gets Framework in IPA, Web gets JavaScript, Desktop gets native binaries.",
                "<b>Step 5 - Runtime:</b> End users' devices/browsers load your Angular application from your server/CDN. SDK version independent of Angular version allows separate update cycles.",
            ],
        )
        .section(
            "8. Security Considerations",
            [
                "<b>JWT Generation:</b> All JWT token generation happens in native Dart code, never exposed to JavaScript context. Uses crypto.subtle for HMAC-SHA256 signing. Tokens include expiry (30 seconds), not-before time, and session ID for enhanced security.",
                "<b>Authentication Isolation:</b> SSO authentication performed in hidden/headless WebView that auto-disposes after 30 seconds. Prevents token exposure in visible UI. Cookie-based sessions shared across WebViews on same domain.",
                "<b>Origin Validation:</b> Web implementation validates postMessage origin against configured baseUrl. Rejects messages from unauthorized origins. Prevents cross-site scripting attacks.",
                "<b>HTTPS Enforcement:</b> Production deployments should enforce HTTPS for all Angular app communications. WebView settings can block mixed content (HTTP resources on HTTPS pages).",
                "<b>Content Security Policy:</b> Angular application should implement strict CSP headers. WebView respects CSP, adding additional security layer.",
            ],
        )
        .section(
            "9. Key Architectural Principles",
            [
                "<b>1. Single Source of Truth:</b> EWalletInterface abstract class defines contract for all platforms. Ensures API consistency regardless of underlying implementation.",
                "<b>2. Compile-Time Platform Selection:</b> Conditional imports (dart.library.io, dart.library.html) enable compiler to include only relevant platform code. Results in smaller bundle sizes and faster load times.",
                "<b>3. Runtime Communication Abstraction:</b> Platform-specific messaging mechanisms (JavaScript handlers, postMessage) abstracted behind unified callback/stream API. Developers interact with consistent interface.",
                "<b>4. Angular Application Isolation:</b> Angular codebase remains completely unchanged. SDK acts as adapter layer, handling platform-specific integration details transparently.",
                "<b>5. Security by Default:</b> Sensitive operations (JWT generation, authentication) handled in native code. Auto-disposal of authentication components. Origin validation for cross-frame communication.",
                "<b>6. Performance Optimization:</b> Native WebView rendering on all platforms ensures optimal performance. Lazy loading of Angular application. Efficient communication through binary data transfer where supported.",
            ],
        )
        .section(
            "10. Conclusion",
            [
                "This Cross-Platform Hybrid SDK Architecture provides a robust, maintainable solution for integrating your Angular 19 eWallet application into Flutter apps across all major platforms.",
                "By leveraging platform-specific WebView components, JavaScript-to-Native bridges, and Dart's conditional imports, you achieve true cross-platform compatibility while preserving your existing Angular codebase.",
                "The architecture scales from mobile (Android/iOS) to web browsers to desktop applications (Windows/macOS/Linux) with a single unified API, making it easy for developers to integrate your eWallet functionality.",
                "<b>Next Steps:</b> Follow the implementation steps to create your Flutter plugin package, implement platform-specific adapters, test across all target platforms, and publish to pub.dev for distribution.",
            ],
        )
}


#[cfg(test)]
mod tests {
    use super::*;
    use archdoc_document::ReportStep;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_shape() {
        let report = ewallet_report();
        let sections = report
            .steps
            .iter()
            .filter(|s| matches!(s, ReportStep::Section { .. }))
            .count();
        let code = report
            .steps
            .iter()
            .filter(|s| matches!(s, ReportStep::Code { .. }))
            .count();

        assert!(report.title_page.is_some());
        assert_eq!(sections, 10);
        assert_eq!(report.diagram_count(), 5);
        assert_eq!(code, 2);
    }

    #[test]
    fn test_diagram_names_are_unique() {
        let report = ewallet_report();
        let mut names: Vec<&str> = report
            .steps
            .iter()
            .filter_map(|s| match s {
                ReportStep::Diagram { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_usage_listing_is_truncated() {
        assert!(INTERFACE_CODE.split('\n').count() <= archdoc_document::MAX_CODE_LINES);
        assert!(USAGE_CODE.split('\n').count() > archdoc_document::MAX_CODE_LINES);
    }
}
