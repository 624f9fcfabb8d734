use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlElement};
use yew::prelude::*;

use crate::browser::{
    self, collect_regions, read_contact_form, report_missing, scroll_offset, scroll_to_section,
    scroll_to_top, scrollable_height, spawn_ripple, BrowserScheduler, DomFormView, RevealBindings,
    WindowListener,
};
use crate::config::{LoadedConfig, SiteConfig, SECTION_SELECTOR};
use crate::form::{FormContext, FormKind, NewsletterForm, NotifyFn, Submission};
use crate::logging::{self, log_event, LogLevel};
use crate::notify::{Notice, NoticePhase, Notifier, Severity};
use crate::schedule::Scheduler;
use crate::scroll::{navbar_scrolled, MobileNavPosition, ScrollTracker};
use crate::sections::SectionResolver;

const CONTACT_FORM_ID: &str = "contactForm";
const NEWSLETTER_FORM_ID: &str = "newsletterForm";
const NEWSLETTER_EMAIL_ID: &str = "newsletterEmail";
const CONTACT_SECTION_ID: &str = "contact";

static NAV_ITEMS: [(&str, &str); 6] = [
    ("home", "Início"),
    ("about", "Sobre"),
    ("practice", "Áreas de Atuação"),
    ("team", "Equipe"),
    ("blog", "Blog"),
    ("contact", "Contato"),
];

fn nav_ids() -> impl Iterator<Item = &'static str> {
    NAV_ITEMS.iter().map(|(id, _)| *id)
}

fn scheduler() -> Rc<dyn Scheduler> {
    Rc::new(BrowserScheduler)
}

/// Everything the scroll pipeline writes back into component state.
#[derive(Clone)]
struct ScrollSinks {
    active_section: UseStateSetter<Option<String>>,
    mobile_active: UseStateSetter<Option<String>>,
    navbar_scrolled: UseStateSetter<bool>,
    mobile_nav: UseStateSetter<MobileNavPosition>,
}

/// Listeners and observers that live as long as the page component.
struct PageBindings {
    _scroll: Option<WindowListener>,
    _resize: Option<WindowListener>,
    _reveal: Rc<RevealBindings>,
}

fn install_page_bindings(config: &SiteConfig, sinks: ScrollSinks) -> PageBindings {
    let tracker = Rc::new(RefCell::new(ScrollTracker::new(scroll_offset())));

    {
        let mut desktop = SectionResolver::new(config.nav_offset_px, nav_ids());
        let threshold = config.navbar_scrolled_after_px;
        let sinks = sinks.clone();
        tracker.borrow_mut().subscribe(move |sample| {
            sinks
                .navbar_scrolled
                .set(navbar_scrolled(sample.offset, threshold));

            let activation = desktop.resolve(sample.offset, &collect_regions(SECTION_SELECTOR));
            if activation.changed {
                sinks.active_section.set(activation.active);
            }
        });
    }

    {
        let mut mobile = SectionResolver::new(config.nav_offset_px, nav_ids());
        tracker.borrow_mut().subscribe(move |sample| {
            sinks
                .mobile_nav
                .set(MobileNavPosition::for_direction(sample.direction));

            let activation = mobile.resolve(sample.offset, &collect_regions(SECTION_SELECTOR));
            if activation.changed {
                sinks.mobile_active.set(activation.active);
            }
        });
    }

    let reveal = Rc::new(RevealBindings::install(config, scheduler()));

    let scroll = {
        let tracker = tracker.clone();
        let reveal = reveal.clone();
        WindowListener::add("scroll", move || {
            tracker
                .borrow_mut()
                .observe(scroll_offset(), scrollable_height());
            reveal.recalculate();
        })
    };

    let resize = {
        let reveal = reveal.clone();
        WindowListener::add("resize", move || reveal.recalculate())
    };

    tracker
        .borrow_mut()
        .observe(scroll_offset(), scrollable_height());

    PageBindings {
        _scroll: scroll,
        _resize: resize,
        _reveal: reveal,
    }
}

#[derive(Properties, PartialEq)]
struct NavItemProps {
    id: AttrValue,
    label: AttrValue,
    class: &'static str,
    active: bool,
    on_navigate: Callback<AttrValue>,
}

#[function_component(NavItem)]
fn nav_item(props: &NavItemProps) -> Html {
    let onclick = {
        let id = props.id.clone();
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            on_navigate.emit(id.clone());
        })
    };

    html! {
        <a
            class={classes!(props.class, props.active.then_some("active"))}
            href={format!("#{}", props.id)}
            onclick={onclick}
        >
            {props.label.clone()}
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct NotificationBannerProps {
    notice: Option<Notice>,
}

#[function_component(NotificationBanner)]
fn notification_banner(props: &NotificationBannerProps) -> Html {
    let Some(notice) = props.notice.as_ref() else {
        return html! {};
    };

    let leaving = notice.phase == NoticePhase::Leaving;
    html! {
        <div
            class={classes!("notification", notice.severity.class(), leaving.then_some("is-leaving"))}
            role="status"
        >
            {notice.message.clone()}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: SiteConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let config = props.config.clone();
    let active_section = use_state_eq(|| None::<String>);
    let mobile_active = use_state_eq(|| None::<String>);
    let scrolled = use_state_eq(|| false);
    let mobile_nav = use_state_eq(|| MobileNavPosition::Shown);
    let menu_open = use_state_eq(|| false);
    let notice = use_state_eq(|| None::<Notice>);

    let notifier = {
        let publish = notice.setter();
        let dismiss_ms = config.notification_dismiss_ms;
        let exit_ms = config.notification_exit_ms;
        use_memo((), move |_| {
            Notifier::new(scheduler(), dismiss_ms, exit_ms, move |current| {
                publish.set(current)
            })
        })
    };
    let contact_submission = use_memo((), |_| Rc::new(RefCell::new(Submission::default())));
    let newsletter_submission = use_memo((), |_| Rc::new(RefCell::new(Submission::default())));

    {
        let config = config.clone();
        let sinks = ScrollSinks {
            active_section: active_section.setter(),
            mobile_active: mobile_active.setter(),
            navbar_scrolled: scrolled.setter(),
            mobile_nav: mobile_nav.setter(),
        };
        use_effect_with((), move |_| {
            scroll_to_top();
            let bindings = install_page_bindings(&config, sinks);
            move || drop(bindings)
        });
    }

    let notify: NotifyFn = {
        let notifier = (*notifier).clone();
        Rc::new(move |message: &str, severity: Severity| {
            notifier.show(message, severity);
        })
    };

    let on_navigate = {
        let menu_open = menu_open.clone();
        let nav_offset = config.nav_offset_px;
        Callback::from(move |id: AttrValue| {
            menu_open.set(false);
            if let Err(error) = scroll_to_section(&id, nav_offset) {
                report_missing(&error);
            }
        })
    };

    let on_contact_cta = {
        let on_navigate = on_navigate.clone();
        Callback::from(move |_: MouseEvent| on_navigate.emit(AttrValue::from(CONTACT_SECTION_ID)))
    };

    let on_toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    let on_ripple = {
        let duration_ms = config.ripple_duration_ms;
        Callback::from(move |event: MouseEvent| {
            let Some(button) = event
                .current_target()
                .and_then(|target| target.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            if button.get_attribute("type").as_deref() == Some("submit") {
                return;
            }
            spawn_ripple(
                &button,
                event.client_x(),
                event.client_y(),
                duration_ms,
                scheduler().as_ref(),
            );
        })
    };

    let on_hero_cta = {
        let on_ripple = on_ripple.clone();
        let on_contact_cta = on_contact_cta.clone();
        Callback::from(move |event: MouseEvent| {
            on_ripple.emit(event.clone());
            on_contact_cta.emit(event);
        })
    };

    let on_back_to_top = {
        let on_ripple = on_ripple.clone();
        let on_navigate = on_navigate.clone();
        Callback::from(move |event: MouseEvent| {
            on_ripple.emit(event);
            on_navigate.emit(AttrValue::from("home"));
        })
    };

    let submit_contact = {
        let notify = notify.clone();
        let submission = (*contact_submission).clone();
        let delay_ms = config.submit_delay_ms;
        Callback::from(move |_: ()| {
            let view = match DomFormView::find(CONTACT_FORM_ID) {
                Ok(view) => view,
                Err(error) => {
                    report_missing(&error);
                    return;
                }
            };
            let context = FormContext {
                kind: FormKind::Contact,
                view: Rc::new(view),
                submission: submission.clone(),
                notify: notify.clone(),
                scheduler: scheduler(),
                delay_ms,
            };
            let _ = context.submit(read_contact_form());
        })
    };

    let on_contact_submit = {
        let submit_contact = submit_contact.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            submit_contact.emit(());
        })
    };

    let on_message_keydown = {
        let submit_contact = submit_contact.clone();
        Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Enter" && event.ctrl_key() {
                submit_contact.emit(());
            }
        })
    };

    let on_newsletter_submit = {
        let notify = notify.clone();
        let submission = (*newsletter_submission).clone();
        let delay_ms = config.submit_delay_ms;
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let view = match DomFormView::find(NEWSLETTER_FORM_ID) {
                Ok(view) => view,
                Err(error) => {
                    report_missing(&error);
                    return;
                }
            };
            let context = FormContext {
                kind: FormKind::Newsletter,
                view: Rc::new(view),
                submission: submission.clone(),
                notify: notify.clone(),
                scheduler: scheduler(),
                delay_ms,
            };
            let _ = context.submit(NewsletterForm {
                email: browser::control_value(NEWSLETTER_EMAIL_ID),
            });
        })
    };

    let nav_links = NAV_ITEMS
        .iter()
        .map(|(id, label)| {
            html! {
                <li>
                    <NavItem
                        id={*id}
                        label={*label}
                        class="nav-link"
                        active={active_section.as_deref() == Some(*id)}
                        on_navigate={on_navigate.clone()}
                    />
                </li>
            }
        })
        .collect::<Html>();

    let mobile_links = NAV_ITEMS
        .iter()
        .filter(|(id, _)| *id != "blog")
        .map(|(id, label)| {
            html! {
                <NavItem
                    id={*id}
                    label={*label}
                    class="mobile-nav-link"
                    active={mobile_active.as_deref() == Some(*id)}
                    on_navigate={on_navigate.clone()}
                />
            }
        })
        .collect::<Html>();

    let mobile_nav_style = format!("transform: {};", mobile_nav.transform());

    html! {
        <>
            <nav id="navbar" class={classes!("navbar", scrolled.then_some("scrolled"))}>
                <div class="nav-container">
                    <a class="nav-logo" href="#home">{"Almeida & Rocha"}<span>{" Advogados"}</span></a>
                    <ul id="navMenu" class={classes!("nav-menu", menu_open.then_some("active"))}>
                        {nav_links}
                    </ul>
                    <button
                        id="hamburger"
                        class={classes!("hamburger", menu_open.then_some("active"))}
                        type="button"
                        aria-label="Abrir menu"
                        aria-expanded={menu_open.to_string()}
                        onclick={on_toggle_menu}
                    >
                        <span class="bar"></span>
                        <span class="bar"></span>
                        <span class="bar"></span>
                    </button>
                </div>
            </nav>

            <header id="home" class="hero">
                <div class="hero-content">
                    <h1>{"Advocacia estratégica para empresas e famílias"}</h1>
                    <p>{"Há mais de duas décadas transformando problemas jurídicos complexos em soluções claras."}</p>
                    <div class="hero-actions">
                        <button class="cta-button" type="button" onclick={on_hero_cta}>
                            {"Agende uma Consulta"}
                        </button>
                    </div>
                </div>
            </header>

            <section id="about" class="section about">
                <div class="container">
                    <div class="about-text">
                        <h2>{"Sobre o Escritório"}</h2>
                        <p>{"Fundado em 2001, o escritório reúne advogados com atuação consultiva e contenciosa, sempre com atendimento próximo e transparente."}</p>
                        <p>{"Nossa prioridade é entender o negócio e a história de cada cliente antes de propor qualquer caminho."}</p>
                    </div>
                    <div class="stats">
                        <div class="stat">
                            <span class="stat-number" data-target="23">{"0"}</span>
                            <span class="stat-label">{"anos de atuação"}</span>
                        </div>
                        <div class="stat">
                            <span class="stat-number" data-target="1500">{"0"}</span>
                            <span class="stat-label">{"casos concluídos"}</span>
                        </div>
                        <div class="stat">
                            <span class="stat-number" data-target="98">{"0"}</span>
                            <span class="stat-label">{"% de clientes satisfeitos"}</span>
                        </div>
                        <div class="stat">
                            <span class="stat-number" data-target="12">{"0"}</span>
                            <span class="stat-label">{"especialistas"}</span>
                        </div>
                    </div>
                </div>
            </section>

            <section id="practice" class="section practice">
                <div class="container">
                    <h2>{"Áreas de Atuação"}</h2>
                    <div class="practice-grid">
                        <article class="practice-card">
                            <h3>{"Direito Empresarial"}</h3>
                            <p>{"Contratos, societário e reestruturações."}</p>
                        </article>
                        <article class="practice-card">
                            <h3>{"Direito Trabalhista"}</h3>
                            <p>{"Consultoria preventiva e defesa em reclamações."}</p>
                        </article>
                        <article class="practice-card">
                            <h3>{"Direito de Família"}</h3>
                            <p>{"Divórcios, guarda, inventários e planejamento sucessório."}</p>
                        </article>
                        <article class="practice-card">
                            <h3>{"Direito Tributário"}</h3>
                            <p>{"Planejamento fiscal e contencioso administrativo."}</p>
                        </article>
                    </div>
                </div>
            </section>

            <section id="team" class="section team">
                <div class="container">
                    <h2>{"Nossa Equipe"}</h2>
                    <div class="team-grid">
                        <article class="team-card">
                            <h3>{"Dra. Helena Almeida"}</h3>
                            <p>{"Sócia fundadora, Direito Empresarial"}</p>
                        </article>
                        <article class="team-card">
                            <h3>{"Dr. Marcos Rocha"}</h3>
                            <p>{"Sócio, Direito Tributário"}</p>
                        </article>
                        <article class="team-card">
                            <h3>{"Dra. Beatriz Lima"}</h3>
                            <p>{"Associada, Direito de Família"}</p>
                        </article>
                    </div>
                </div>
            </section>

            <section id="blog" class="section blog">
                <div class="container">
                    <h2>{"Artigos"}</h2>
                    <div class="blog-grid">
                        <article class="blog-card">
                            <h3>{"Holding familiar: quando vale a pena?"}</h3>
                            <p>{"Os pontos que devem ser avaliados antes de reorganizar o patrimônio."}</p>
                        </article>
                        <article class="blog-card">
                            <h3>{"Home office e a legislação trabalhista"}</h3>
                            <p>{"O que muda para empregadores com equipes remotas."}</p>
                        </article>
                    </div>
                </div>
            </section>

            <section id="contact" class="section contact">
                <div class="container contact-grid">
                    <div class="contact-info">
                        <h2>{"Fale Conosco"}</h2>
                        <div class="contact-item">
                            <strong>{"Endereço"}</strong>
                            <span>{"Av. Paulista, 1000, São Paulo, SP"}</span>
                        </div>
                        <div class="contact-item">
                            <strong>{"Telefone"}</strong>
                            <span>{"(11) 3000-0000"}</span>
                        </div>
                        <div class="contact-item">
                            <strong>{"E-mail"}</strong>
                            <span>{"contato@almeidarocha.adv.br"}</span>
                        </div>
                    </div>
                    <form id={CONTACT_FORM_ID} class="contact-form" novalidate={true} onsubmit={on_contact_submit}>
                        <input id="name" type="text" placeholder="Nome completo" />
                        <input id="email" type="email" placeholder="E-mail" />
                        <input id="phone" type="tel" placeholder="Telefone" />
                        <select id="subject">
                            <option value="">{"Selecione o assunto"}</option>
                            <option value="empresarial">{"Direito Empresarial"}</option>
                            <option value="trabalhista">{"Direito Trabalhista"}</option>
                            <option value="familia">{"Direito de Família"}</option>
                            <option value="tributario">{"Direito Tributário"}</option>
                        </select>
                        <textarea id="message" rows="5" placeholder="Mensagem" onkeydown={on_message_keydown}></textarea>
                        <button class="btn btn-primary" type="submit">{"Enviar Mensagem"}</button>
                    </form>
                </div>
            </section>

            <footer class="footer">
                <div class="container footer-grid">
                    <p>{"© Almeida & Rocha Advogados"}</p>
                    <form id={NEWSLETTER_FORM_ID} class="newsletter-form" novalidate={true} onsubmit={on_newsletter_submit}>
                        <input id={NEWSLETTER_EMAIL_ID} type="email" placeholder="Seu e-mail" />
                        <button class="btn" type="submit">{"Assinar"}</button>
                    </form>
                    <button class="btn btn-outline" type="button" onclick={on_back_to_top}>
                        {"Voltar ao topo"}
                    </button>
                </div>
            </footer>

            <nav id="mobileNav" class="mobile-nav" style={mobile_nav_style}>
                {mobile_links}
            </nav>

            <NotificationBanner notice={(*notice).clone()} />
        </>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let LoadedConfig { config, rejected } = browser::read_config();
    logging::set_min_level(config.log_level);
    for key in rejected {
        log_event(LogLevel::Info, "config_override_rejected", json!({ "key": key }));
    }
    log_event(
        LogLevel::Info,
        "site_started",
        json!({ "nav_offset_px": config.nav_offset_px, "log_level": config.log_level.as_str() }),
    );

    yew::Renderer::<App>::with_root_and_props(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
        AppProps { config },
    )
    .render();
}
